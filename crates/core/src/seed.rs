//! Default catalog records written on first run.

use crate::product::Product;
use crate::types::{Category, Price};

const SILENT_PREVIEW: &str = "assets/audio/silence.wav";

fn cover(photo: &str) -> String {
    format!(
        "https://images.pexels.com/photos/{photo}?auto=compress&cs=tinysrgb&w=640&h=400&dpr=2"
    )
}

#[allow(clippy::too_many_arguments)]
fn track(
    category: Category,
    id: &str,
    title: &str,
    rand: i64,
    bpm: u32,
    key: &str,
    photo: &str,
    tags: &[&str],
) -> Product {
    let mut product = Product::new(id, title, Price::from_cents(rand * 100), category);
    product.bpm = Some(bpm);
    product.key = Some(key.to_string());
    product.cover = cover(photo);
    product.audio = Some(SILENT_PREVIEW.to_string());
    product.tags = tags.iter().map(ToString::to_string).collect();
    product
}

/// Default beats.
#[must_use]
pub fn beats() -> Vec<Product> {
    vec![
        track(
            Category::Beats,
            "beat-01",
            "Midnight Drive",
            249,
            90,
            "Am",
            "633409/pexels-photo-633409.jpeg",
            &["Trap", "Dark"],
        ),
        track(
            Category::Beats,
            "beat-02",
            "Sunset Bounce",
            199,
            100,
            "Cm",
            "164745/pexels-photo-164745.jpeg",
            &["Afro", "Uplift"],
        ),
        track(
            Category::Beats,
            "beat-03",
            "Neon Nights",
            299,
            140,
            "Fm",
            "2747446/pexels-photo-2747446.jpeg",
            &["Club", "EDM"],
        ),
    ]
}

/// Default music releases.
#[must_use]
pub fn music() -> Vec<Product> {
    vec![
        track(
            Category::Music,
            "track-01",
            "Midnight Drive (Full Song)",
            49,
            90,
            "Am",
            "633409/pexels-photo-633409.jpeg",
            &["Trap"],
        ),
        track(
            Category::Music,
            "track-02",
            "Sunset Bounce (Full Song)",
            49,
            100,
            "Cm",
            "164745/pexels-photo-164745.jpeg",
            &["Afro"],
        ),
    ]
}

/// Default sample packs.
#[must_use]
pub fn sample_packs() -> Vec<Product> {
    let pack = |id: &str, title: &str, rand: i64, files: u32, photo: &str, tags: &[&str]| {
        let price = Price::from_cents(rand * 100);
        let mut product = Product::new(id, title, price, Category::SamplePacks);
        product.files = Some(files);
        product.cover = cover(photo);
        product.tags = tags.iter().map(ToString::to_string).collect();
        product
    };

    vec![
        pack(
            "pack-01",
            "Vocal Hooks Vol.1",
            149,
            120,
            "995301/pexels-photo-995301.jpeg",
            &["Vocals", "Hooks"],
        ),
        pack(
            "pack-02",
            "Afro Essentials",
            129,
            220,
            "15905/pexels-photo.jpg",
            &["Afro", "Percussion"],
        ),
    ]
}

/// Default vocal presets.
#[must_use]
pub fn vocal_presets() -> Vec<Product> {
    let preset = |id: &str, title: &str, daw: &str, photo: &str| {
        let mut product = Product::new(id, title, Price::from_cents(9900), Category::VocalPresets);
        product.daw = Some(daw.to_string());
        product.cover = cover(photo);
        product
    };

    vec![
        preset("preset-01", "Clean Pop Vox", "FL Studio", "33779/hand-microphone-mic-hold.jpg"),
        preset("preset-02", "Warm RnB Vox", "Logic Pro", "675960/pexels-photo-675960.jpeg"),
    ]
}

/// Defaults for one category.
#[must_use]
pub fn for_category(category: Category) -> Vec<Product> {
    match category {
        Category::Beats => beats(),
        Category::Music => music(),
        Category::SamplePacks => sample_packs(),
        Category::VocalPresets => vocal_presets(),
    }
}

/// Every default record, in category order.
#[must_use]
pub fn all() -> Vec<Product> {
    Category::ALL.into_iter().flat_map(for_category).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_seed_ids_are_unique() {
        let products = all();
        let ids: HashSet<_> = products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn test_seed_categories_match() {
        for category in Category::ALL {
            assert!(for_category(category).iter().all(|p| p.category == category));
        }
    }

    #[test]
    fn test_previews_only_where_playable() {
        for product in all() {
            assert_eq!(product.audio.is_some(), product.category.has_previews());
        }
    }
}
