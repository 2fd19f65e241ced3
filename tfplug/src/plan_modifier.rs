//! Built-in attribute plan modifiers

use crate::schema::{PlanModifier, PlanModifierRequest, PlanModifierResponse};
use crate::types::Dynamic;

/// Marks the resource for replacement when the attribute changes.
///
/// Never triggers on create, and only compares known planned values.
pub struct RequiresReplace;

impl PlanModifier for RequiresReplace {
    fn description(&self) -> String {
        "changing this attribute forces replacement of the resource".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let requires_replace = !request.is_create
            && !request.plan_value.is_unknown()
            && request.plan_value.value != request.state_value.value;

        PlanModifierResponse {
            plan_value: request.plan_value,
            requires_replace,
            diagnostics: vec![],
        }
    }
}

/// Keeps the prior state value when the planned value is unknown.
///
/// Useful for computed attributes that never change once the resource
/// exists, so updates do not show them as "known after apply".
pub struct UseStateForUnknown;

impl PlanModifier for UseStateForUnknown {
    fn description(&self) -> String {
        "once set, the value of this attribute in state will not change".to_string()
    }

    fn modify(&self, request: PlanModifierRequest) -> PlanModifierResponse {
        let keep_state = request.plan_value.is_unknown()
            && !request.config_value.is_unknown()
            && !matches!(request.state_value.value, Dynamic::Null);

        PlanModifierResponse {
            plan_value: if keep_state {
                request.state_value
            } else {
                request.plan_value
            },
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, DynamicValue};

    fn request(state: Dynamic, plan: Dynamic, config: Dynamic, is_create: bool) -> PlanModifierRequest {
        PlanModifierRequest {
            config_value: DynamicValue::new(config),
            state_value: DynamicValue::new(state),
            plan_value: DynamicValue::new(plan),
            path: AttributePath::new("mac"),
            is_create,
        }
    }

    #[test]
    fn requires_replace_on_change() {
        let response = RequiresReplace.modify(request(
            "aa:aa:aa:aa:aa:aa".into(),
            "bb:bb:bb:bb:bb:bb".into(),
            "bb:bb:bb:bb:bb:bb".into(),
            false,
        ));
        assert!(response.requires_replace);
    }

    #[test]
    fn requires_replace_ignores_create_and_unknown() {
        let on_create = RequiresReplace.modify(request(
            Dynamic::Null,
            "bb:bb:bb:bb:bb:bb".into(),
            "bb:bb:bb:bb:bb:bb".into(),
            true,
        ));
        assert!(!on_create.requires_replace);

        let unknown = RequiresReplace.modify(request(
            "aa:aa:aa:aa:aa:aa".into(),
            Dynamic::Unknown,
            Dynamic::Unknown,
            false,
        ));
        assert!(!unknown.requires_replace);

        let unchanged = RequiresReplace.modify(request(
            "aa:aa:aa:aa:aa:aa".into(),
            "aa:aa:aa:aa:aa:aa".into(),
            "aa:aa:aa:aa:aa:aa".into(),
            false,
        ));
        assert!(!unchanged.requires_replace);
    }

    #[test]
    fn null_to_value_on_update_requires_replace() {
        let response = RequiresReplace.modify(request(
            Dynamic::Null,
            "bb:bb:bb:bb:bb:bb".into(),
            "bb:bb:bb:bb:bb:bb".into(),
            false,
        ));
        assert!(response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_preserves_state_when_unknown() {
        let response = UseStateForUnknown.modify(request(
            "freebox-host".into(),
            Dynamic::Unknown,
            Dynamic::Null,
            false,
        ));

        assert_eq!(response.plan_value.value, Dynamic::from("freebox-host"));
        assert!(!response.requires_replace);
    }

    #[test]
    fn use_state_for_unknown_keeps_known_plan_and_unknown_config() {
        let known = UseStateForUnknown.modify(request(
            "old".into(),
            "new".into(),
            "new".into(),
            false,
        ));
        assert_eq!(known.plan_value.value, Dynamic::from("new"));

        let unknown_config = UseStateForUnknown.modify(request(
            "old".into(),
            Dynamic::Unknown,
            Dynamic::Unknown,
            false,
        ));
        assert!(unknown_config.plan_value.is_unknown());

        let on_create = UseStateForUnknown.modify(request(
            Dynamic::Null,
            Dynamic::Unknown,
            Dynamic::Null,
            true,
        ));
        assert!(on_create.plan_value.is_unknown());
    }
}
