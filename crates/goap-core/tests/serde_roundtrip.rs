#![cfg(feature = "serde")]

use goap_core::{GoalData, State, Vec3};

#[test]
fn state_json_roundtrip_keeps_identity() {
    let states = vec![State::new("HaveEnergy", true), State::new("CanRest", false)];

    let json = serde_json::to_string(&states).expect("serialize");
    assert!(json.contains(r#""key":"HaveEnergy""#));
    assert!(!json.contains("_on"));

    let roundtrip: Vec<State> = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, states);
    assert_eq!(roundtrip[0].unique_id(), "HaveEnergy_on");
    assert_eq!(roundtrip[1].unique_id(), "CanRest_off");
}

#[test]
fn vec3_and_goal_data_json_roundtrip() {
    let target = Vec3::new(1.5, 0.0, -2.0);
    let json = serde_json::to_string(&target).expect("serialize");
    let roundtrip: Vec3 = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, target);

    let data = GoalData {
        name: "Rest".into(),
        priority: 0.5,
        can_run: true,
    };
    let json = serde_json::to_string(&data).expect("serialize");
    let roundtrip: GoalData = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, data);
}
