//! Image URL conventions for the marketplace CDN.

/// Base url of the marketplace image CDN.
pub const CDN_BASE: &str = "https://http2.mlstatic.com";

/// Fallback image used when an item resolves no pictures at all.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// Maps a picture id to its (full, thumbnail) url pair. The CDN convention is `D_{id}-O.jpg` for
/// the full-size rendition and `D_{id}-I.jpg` for the thumbnail.
pub fn picture_image_urls(picture_id: &str) -> (String, String) {
    (format!("{CDN_BASE}/D_{picture_id}-O.jpg"), format!("{CDN_BASE}/D_{picture_id}-I.jpg"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn picture_url_convention() {
        let (full, thumb) = picture_image_urls("652861-MLA47109327921_082021");
        assert_eq!(full, "https://http2.mlstatic.com/D_652861-MLA47109327921_082021-O.jpg");
        assert_eq!(thumb, "https://http2.mlstatic.com/D_652861-MLA47109327921_082021-I.jpg");
    }
}
