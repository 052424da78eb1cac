//! Deterministic static-image dataset for demos and smoke runs.

use chrono::{DateTime, Utc};
use picker_core::resource::StaticImageData;
use picker_core::{LibraryPayload, LibraryResource, Localized, PlanSlug, ResourceStatus};
use smallvec::smallvec;

const COLOURS: [&str; 5] = ["red", "green", "blue", "amber", "slate"];
const SUBJECTS: [&str; 4] = ["Sunset", "Forest", "Harbor", "Meadow"];
const BASE_TS: i64 = 1_700_000_000;

/// `n` static images with cursors `1..=n`; colour tags rotate every item,
/// every third item is also tagged `featured`.
pub fn static_images(n: usize) -> Vec<LibraryResource> {
    (0..n).map(static_image).collect()
}

fn static_image(i: usize) -> LibraryResource {
    let seq = i + 1;
    let colour = COLOURS[i % COLOURS.len()];
    let subject = SUBJECTS[i % SUBJECTS.len()];
    let src = format!("https://cdn.example.com/library/static/{seq:03}.jpg");
    let mut tags: smallvec::SmallVec<[String; 4]> = smallvec![colour.to_string()];
    if seq % 3 == 0 {
        tags.push("featured".to_string());
    }
    let created = DateTime::<Utc>::from_timestamp(BASE_TS + (seq as i64) * 3600, 0).unwrap_or_default();
    LibraryResource {
        id: format!("img-{seq:03}"),
        title: Localized::en(format!("{} {} {:02}", capitalize(colour), subject, seq)),
        description: None,
        tags: Some(tags),
        allowed_plan_slugs: vec![PlanSlug::All],
        status: ResourceStatus::Active,
        created_at: created,
        updated_at: created,
        cursor: seq as u64,
        main_image_src: Some(src.clone()),
        resource: LibraryPayload::StaticImage { data: StaticImageData { src } },
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        Some(f) => f.to_uppercase().chain(c).collect(),
        None => String::new(),
    }
}
