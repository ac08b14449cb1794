//! Domain Tests
//!
//! Entity rules, draft validation, and wire-format compatibility.

#[cfg(test)]
mod tests {
    use crate::domain::{image_object_key, Part, PartDraft};

    fn sample_part() -> Part {
        Part {
            id: "abc123".to_string(),
            part_name: "Bolt M6".to_string(),
            quantity: 40,
            cabinet_name: "3".to_string(),
            shelf_row: "2".to_string(),
            shelf_column: "1".to_string(),
            remarks: "zinc plated".to_string(),
            image_url: "https://img/bolt_1.jpg".to_string(),
            image_urls: vec![
                "https://img/bolt_1.jpg".to_string(),
                "https://img/bolt_2.jpg".to_string(),
            ],
            created_at: None,
        }
    }

    #[test]
    fn display_prefers_multi_image_list() {
        let part = sample_part();
        assert_eq!(part.display_image_urls(), part.image_urls);
    }

    #[test]
    fn display_falls_back_to_legacy_url() {
        let mut part = sample_part();
        part.image_urls.clear();
        assert_eq!(
            part.display_image_urls(),
            vec!["https://img/bolt_1.jpg".to_string()]
        );

        part.image_url.clear();
        assert!(part.display_image_urls().is_empty());
    }

    #[test]
    fn all_image_urls_deduplicates_legacy_entry() {
        let part = sample_part();
        // legacy url is also first in the list; it must appear once
        assert_eq!(
            part.all_image_urls(),
            vec![
                "https://img/bolt_1.jpg".to_string(),
                "https://img/bolt_2.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn object_keys_use_underscores_and_one_based_suffix() {
        assert_eq!(
            image_object_key("Bolt M6", 0),
            "parts_inventory_01/Bolt_M6_1.jpg"
        );
        assert_eq!(
            image_object_key("  Hex Nut  ", 4),
            "parts_inventory_01/Hex_Nut_5.jpg"
        );
    }

    #[test]
    fn blank_name_fails_add_validation() {
        let draft = PartDraft {
            part_name: "   ".to_string(),
            ..PartDraft::default()
        };
        assert!(draft.validate_new().is_err());

        let draft = PartDraft {
            part_name: "Washer".to_string(),
            ..PartDraft::default()
        };
        assert!(draft.validate_new().is_ok());
    }

    #[test]
    fn update_validation_requires_all_but_remarks() {
        let mut draft = PartDraft {
            part_name: "Washer".to_string(),
            quantity: "12".to_string(),
            cabinet_name: "1".to_string(),
            shelf_row: "1".to_string(),
            shelf_column: "4".to_string(),
            remarks: String::new(),
        };
        assert!(draft.validate_update().is_ok());

        draft.shelf_row.clear();
        assert!(draft.validate_update().is_err());
    }

    #[test]
    fn unparsable_quantity_defaults_to_zero() {
        let mut draft = PartDraft::default();
        draft.quantity = "abc".to_string();
        assert_eq!(draft.parsed_quantity(), 0);

        draft.quantity = " 17 ".to_string();
        assert_eq!(draft.parsed_quantity(), 17);
    }

    #[test]
    fn speech_fragments_append_with_single_space() {
        let mut draft = PartDraft::default();
        draft.append_remarks("left over");
        draft.append_remarks("  from assembly  ");
        draft.append_remarks("");
        assert_eq!(draft.remarks, "left over from assembly");
    }

    #[test]
    fn apply_to_preserves_image_fields() {
        let original = sample_part();
        let mut draft = PartDraft::from_part(&original);
        draft.part_name = "Bolt M8".to_string();
        draft.quantity = "7".to_string();

        let updated = draft.apply_to(&original);
        assert_eq!(updated.part_name, "Bolt M8");
        assert_eq!(updated.quantity, 7);
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.image_url, original.image_url);
        assert_eq!(updated.image_urls, original.image_urls);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn wire_format_uses_camel_case_names() {
        let part = sample_part();
        let value = serde_json::to_value(&part).expect("serialize");
        assert_eq!(value["partName"], "Bolt M6");
        assert_eq!(value["cabinetName"], "3");
        assert_eq!(value["imageUrls"].as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn legacy_record_without_newer_fields_deserializes() {
        // A record written before imageUrls and createdAt existed
        let raw = serde_json::json!({
            "id": "legacy1",
            "partName": "Old Washer",
            "quantity": 3,
            "imageUrl": "https://img/washer.jpg"
        });
        let part: Part = serde_json::from_value(raw).expect("deserialize legacy");
        assert_eq!(part.part_name, "Old Washer");
        assert!(part.image_urls.is_empty());
        assert!(part.created_at.is_none());
        assert_eq!(
            part.display_image_urls(),
            vec!["https://img/washer.jpg".to_string()]
        );
    }
}
