use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in `ReferenceData`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    KeyMismatch { kind: &'static str, key: String, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::KeyMismatch { kind, key, id } => {
                write!(f, "{kind} stored under '{key}' declares id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `ReferenceData` snapshot.
///
/// ```
/// use exile_data::{AreaDef, ReferenceData, validate_reference_data};
///
/// let mut data = ReferenceData::default();
/// data.areas.insert(
///     "1_1_town".into(),
///     AreaDef {
///         id: "1_1_town".into(),
///         name: "Lioneye's Watch".into(),
///         act: 1,
///         is_town_area: true,
///         has_waypoint: true,
///         crafting_recipes: Vec::new(),
///     },
/// );
/// assert!(validate_reference_data(&data).is_empty());
/// ```
pub fn validate_reference_data(data: &ReferenceData) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (key, area) in &data.areas {
        check_key("area", key, &area.id, &mut errors);
        if area.name.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("area '{key}' has an empty name"),
            });
        }
    }

    for (key, gem) in &data.gems {
        check_key("gem", key, &gem.id, &mut errors);
    }

    for (key, quest) in &data.quests {
        check_key("quest", key, &quest.id, &mut errors);
        for (offer_id, offer) in &quest.reward_offers {
            let context = format!("quest '{key}' reward offer '{offer_id}'");
            for gem_id in offer.quest.keys().chain(offer.vendor.keys()) {
                check_gem(data, gem_id, &context, &mut errors);
            }
        }
    }

    for (alias, base) in data.awakened_gem_lookup.iter().chain(&data.vaal_gem_lookup) {
        check_gem(data, base, &format!("gem remap '{alias}'"), &mut errors);
        if alias == base {
            errors.push(ValidationError::InvalidValue {
                context: format!("gem remap '{alias}' points at itself"),
            });
        }
    }

    errors
}

fn check_key(kind: &'static str, key: &str, id: &str, errors: &mut Vec<ValidationError>) {
    if key != id {
        errors.push(ValidationError::KeyMismatch {
            kind,
            key: key.to_string(),
            id: id.to_string(),
        });
    }
}

fn check_gem(data: &ReferenceData, id: &str, context: &str, errors: &mut Vec<ValidationError>) {
    if !data.gems.contains_key(id) {
        errors.push(ValidationError::MissingReference {
            kind: "gem",
            id: id.to_string(),
            context: context.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn gem(id: &str) -> GemDef {
        GemDef {
            id: id.to_string(),
            name: format!("Gem {id}"),
            is_support: false,
            required_level: 1,
        }
    }

    fn base_data() -> ReferenceData {
        let mut data = ReferenceData::default();
        data.gems.insert("fireball".into(), gem("fireball"));
        data
    }

    #[test]
    fn clean_data_has_no_errors() {
        assert!(validate_reference_data(&base_data()).is_empty());
    }

    #[test]
    fn mismatched_keys_are_reported() {
        let mut data = base_data();
        data.gems.insert("alias".into(), gem("fireball"));
        let errors = validate_reference_data(&data);
        assert_eq!(
            errors,
            vec![ValidationError::KeyMismatch {
                kind: "gem",
                key: "alias".into(),
                id: "fireball".into(),
            }]
        );
    }

    #[test]
    fn reward_offers_must_reference_known_gems() {
        let mut data = base_data();
        let mut offer = RewardOfferDef::default();
        offer.vendor.insert("arc".into(), VendorRewardDef::default());
        let mut reward_offers = BTreeMap::new();
        reward_offers.insert("0".to_string(), offer);
        data.quests.insert(
            "a1q1".into(),
            QuestDef {
                id: "a1q1".into(),
                name: "Enemy at the Gate".into(),
                act: 1,
                reward_offers,
            },
        );
        let errors = validate_reference_data(&data);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("missing gem 'arc'"));
    }

    #[test]
    fn remaps_must_land_on_known_gems() {
        let mut data = base_data();
        data.vaal_gem_lookup.insert("vaal_arc".into(), "arc".into());
        data.awakened_gem_lookup.insert("fireball".into(), "fireball".into());
        let errors = validate_reference_data(&data);
        assert_eq!(errors.len(), 2);
    }
}
