use serde::Serialize;

use crate::model::{BirdRecord, EntityId};

/// One image in the gallery, before URL resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub bird_id: EntityId,
    pub bird_name: String,
    /// Blob storage path, resolved to a URL by the caller.
    pub path: String,
}

/// Every image across `records`, in record then image order.
pub fn gallery(records: &[BirdRecord]) -> Vec<GalleryItem> {
    records
        .iter()
        .flat_map(|bird| {
            bird.images.iter().map(move |path| GalleryItem {
                bird_id: bird.id.clone(),
                bird_name: bird.name().to_owned(),
                path: path.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_item_per_image_in_order() {
        let mut a = BirdRecord::new(1);
        a.local_name = "Hudhud".into();
        a.images = vec!["a1.jpg".into(), "a2.jpg".into()];
        let b = BirdRecord::new(2);
        let mut c = BirdRecord::new(3);
        c.images = vec!["c1.jpg".into()];

        let items = gallery(&[a, b, c]);
        let paths: Vec<_> = items.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, ["a1.jpg", "a2.jpg", "c1.jpg"]);
        assert_eq!(items[0].bird_name, "Hudhud");
        assert_eq!(items[2].bird_name, "(unnamed)");
    }
}
