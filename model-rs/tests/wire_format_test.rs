use lunchmenu_model::*;
use serde_json::json;

fn sample_week() -> WeekMenu {
    let mut week = WeekMenu::new();
    for day in Weekday::ALL {
        week.insert(day, Vec::new());
    }
    week.insert(
        Weekday::Monday,
        vec![MenuItem {
            name: "Salmon soup".to_string(),
            description: Some("with rye bread".to_string()),
            price: Some("12,70 €".to_string()),
            diets: vec!["L".to_string(), "G".to_string()],
        }],
    );
    week
}

#[test]
fn week_menu_serializes_as_plain_weekday_object() {
    let value = serde_json::to_value(sample_week()).unwrap();

    assert_eq!(
        value,
        json!({
            "monday": [{
                "name": "Salmon soup",
                "description": "with rye bread",
                "price": "12,70 €",
                "diets": ["L", "G"]
            }],
            "tuesday": [],
            "wednesday": [],
            "thursday": [],
            "friday": []
        })
    );
}

#[test]
fn menu_item_omits_missing_optionals() {
    let value = serde_json::to_value(MenuItem::new("Pea soup")).unwrap();
    assert_eq!(value, json!({ "name": "Pea soup", "diets": [] }));
}

#[test]
fn menu_item_tolerates_sparse_and_extra_fields() {
    // Model output is loosely shaped; only `name` is mandatory
    let item: MenuItem = serde_json::from_value(json!({
        "name": "Vegetable curry",
        "calories": 640
    }))
    .unwrap();

    assert_eq!(item, MenuItem::new("Vegetable curry"));
}

#[test]
fn week_menu_rejects_unknown_weekday_keys() {
    let result: Result<WeekMenu, _> = serde_json::from_value(json!({ "saturday": [] }));
    assert!(result.is_err());
}

#[test]
fn weekday_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Weekday::Thursday).unwrap(), "\"thursday\"");
    let parsed: Weekday = serde_json::from_str("\"tuesday\"").unwrap();
    assert_eq!(parsed, Weekday::Tuesday);
}
