/// Raw status used when the shipment status fetch itself fails.
pub const STATUS_UNKNOWN: &str = "unknown";

/// Maps a raw marketplace shipment status to its human label. Codes outside the fixed table pass
/// through title-cased, so new upstream statuses degrade gracefully instead of erroring.
pub fn status_label(raw: &str) -> String {
    match raw {
        "pending" => "Pending".to_string(),
        "ready_to_ship" => "Ready to ship".to_string(),
        "shipped" => "Shipped".to_string(),
        "delivered" => "Delivered".to_string(),
        "not_delivered" => "Not delivered".to_string(),
        "cancelled" => "Cancelled".to_string(),
        "returned" => "Returned".to_string(),
        other => title_case(other),
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_statuses_use_the_fixed_table() {
        assert_eq!(status_label("pending"), "Pending");
        assert_eq!(status_label("ready_to_ship"), "Ready to ship");
        assert_eq!(status_label("not_delivered"), "Not delivered");
        assert_eq!(status_label("cancelled"), "Cancelled");
    }

    #[test]
    fn unknown_statuses_pass_through_title_cased() {
        assert_eq!(status_label("handling"), "Handling");
        assert_eq!(status_label("ON_HOLD"), "On_hold");
        assert_eq!(status_label(""), "");
    }
}
