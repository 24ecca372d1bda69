//! Trigger classification and concurrency-group generation.
//!
//! Classification is a pure function of the serialized `on:` text (plus the
//! command-trigger flag) — computed fresh on every call, nothing cached.
//! Workflows with issue, pull-request, discussion, push, or dispatch-only
//! triggers already carry a natural disambiguating key (a number, a ref, or
//! explicit dispatch intent), so they are "special": the workflow-level
//! group is enough and no default job-level group is added for them.

use crate::models::workflow::WorkflowData;
use tracing::debug;

/// Trigger names that rule out dispatch-only classification when present
/// alongside `workflow_dispatch`.
const OTHER_TRIGGERS: [&str; 28] = [
    "push",
    "pull_request",
    "pull_request_review",
    "pull_request_review_comment",
    "pull_request_target",
    "issues",
    "issue_comment",
    "discussion",
    "discussion_comment",
    "schedule",
    "repository_dispatch",
    "workflow_run",
    "create",
    "delete",
    "release",
    "deployment",
    "fork",
    "gollum",
    "label",
    "milestone",
    "page_build",
    "public",
    "registry_package",
    "status",
    "watch",
    "merge_group",
    "check_run",
    "check_suite",
];

fn is_pull_request_workflow(on: &str) -> bool {
    on.contains("pull_request")
}

fn is_issue_workflow(on: &str) -> bool {
    on.contains("issues") || on.contains("issue_comment")
}

fn is_discussion_workflow(on: &str) -> bool {
    on.contains("discussion")
}

fn is_push_workflow(on: &str) -> bool {
    on.contains("push")
}

/// True when `workflow_dispatch` is the only trigger in the `on:` section.
///
/// Other triggers are recognized as a YAML key (`name:`) or as the whole
/// final inline token of the trimmed text. The token must match whole: an
/// input parameter named e.g. `push_branch` is not a `push` trigger.
fn is_workflow_dispatch_only(on: &str) -> bool {
    if !on.contains("workflow_dispatch") {
        return false;
    }
    let trimmed = on.trim();
    for trigger in OTHER_TRIGGERS {
        if on.contains(&format!("{trigger}:")) {
            return false;
        }
        if trimmed.ends_with(&format!(" {trigger}")) {
            return false;
        }
    }
    true
}

fn has_special_triggers(workflow: &WorkflowData) -> bool {
    let on = workflow.on.as_str();
    is_issue_workflow(on)
        || is_pull_request_workflow(on)
        || is_discussion_workflow(on)
        || is_push_workflow(on)
        || is_workflow_dispatch_only(on)
}

/// Build the ordered concurrency group keys for a workflow.
///
/// Starts from the fixed base, then appends at most one correlation key by
/// priority; the branches are mutually exclusive and the first match wins.
fn build_concurrency_group_keys(workflow: &WorkflowData, is_command_trigger: bool) -> Vec<String> {
    let on = workflow.on.as_str();
    let mut keys = vec!["gh-aw".to_string(), "${{ github.workflow }}".to_string()];

    if is_command_trigger {
        keys.push("${{ github.event.issue.number || github.event.pull_request.number }}".to_string());
    } else if is_pull_request_workflow(on) && is_issue_workflow(on) {
        keys.push("${{ github.event.issue.number || github.event.pull_request.number }}".to_string());
    } else if is_pull_request_workflow(on) && is_discussion_workflow(on) {
        keys.push("${{ github.event.pull_request.number || github.event.discussion.number }}".to_string());
    } else if is_issue_workflow(on) && is_discussion_workflow(on) {
        keys.push("${{ github.event.issue.number || github.event.discussion.number }}".to_string());
    } else if is_pull_request_workflow(on) {
        // Ref fallback preserves legacy grouping when no PR number is present
        keys.push("${{ github.event.pull_request.number || github.ref }}".to_string());
    } else if is_issue_workflow(on) {
        keys.push("${{ github.event.issue.number }}".to_string());
    } else if is_discussion_workflow(on) {
        keys.push("${{ github.event.discussion.number }}".to_string());
    } else if is_push_workflow(on) {
        keys.push("${{ github.ref }}".to_string());
    }

    keys
}

/// Cancellation is never enabled for command workflows; otherwise it is
/// enabled for pull-request workflows, mixed shapes included.
fn should_enable_cancel_in_progress(workflow: &WorkflowData, is_command_trigger: bool) -> bool {
    if is_command_trigger {
        return false;
    }
    is_pull_request_workflow(&workflow.on)
}

/// Generate the workflow-level concurrency configuration.
///
/// An explicit concurrency override from the workflow data is returned
/// unchanged; user configuration always wins.
pub fn generate_concurrency_config(workflow: &WorkflowData, is_command_trigger: bool) -> String {
    debug!("generating concurrency config: is_command_trigger={is_command_trigger}");

    if !workflow.concurrency.is_empty() {
        debug!("using existing concurrency configuration from workflow data");
        return workflow.concurrency.clone();
    }

    let keys = build_concurrency_group_keys(workflow, is_command_trigger);
    let group = keys.join("-");
    debug!("built concurrency group: {group}");

    let mut config = format!("concurrency:\n  group: \"{group}\"");
    if should_enable_cancel_in_progress(workflow, is_command_trigger) {
        debug!("enabling cancel-in-progress for concurrency group");
        config.push_str("\n  cancel-in-progress: true");
    }
    config
}

/// Generate the job-level concurrency configuration for the agent job.
///
/// Special-trigger workflows are already disambiguated by the workflow-level
/// group, so the default is suppressed for them. Without an engine id there
/// is no stable group name to synthesize and the result is empty.
pub fn generate_job_concurrency_config(workflow: &WorkflowData) -> String {
    if let Some(engine) = &workflow.engine {
        if !engine.concurrency.is_empty() {
            debug!("using engine-configured concurrency");
            return engine.concurrency.clone();
        }
    }

    if has_special_triggers(workflow) {
        debug!("workflow has special triggers, skipping default job concurrency");
        return String::new();
    }

    let engine_id = workflow
        .engine
        .as_ref()
        .map(|engine| engine.id.as_str())
        .unwrap_or("");
    if engine_id.is_empty() {
        return String::new();
    }

    format!("concurrency:\n  group: \"gh-aw-{engine_id}-${{{{ github.workflow }}}}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::workflow::EngineConfig;

    fn workflow_with_on(on: &str) -> WorkflowData {
        WorkflowData {
            on: on.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_trigger_predicates() {
        assert!(is_pull_request_workflow("on:\n  pull_request:\n    types: [opened]"));
        assert!(is_issue_workflow("on:\n  issues:\n    types: [opened]"));
        assert!(is_issue_workflow("on:\n  issue_comment:\n    types: [created]"));
        assert!(is_discussion_workflow("on:\n  discussion:"));
        assert!(is_push_workflow("on:\n  push:\n    branches: [main]"));
        assert!(!is_pull_request_workflow("on:\n  push:"));
    }

    #[test]
    fn test_workflow_dispatch_only_inline_and_object_forms() {
        assert!(is_workflow_dispatch_only("on: workflow_dispatch:"));
        assert!(is_workflow_dispatch_only("on: workflow_dispatch"));
        assert!(is_workflow_dispatch_only(
            "on:\n  workflow_dispatch:\n    inputs:\n      name:\n        type: string"
        ));
        assert!(!is_workflow_dispatch_only("on:\n  push:\n  workflow_dispatch:"));
        assert!(!is_workflow_dispatch_only("on:\n  workflow_dispatch:\n  schedule:\n  - cron: '0 0 * * *'"));
        assert!(!is_workflow_dispatch_only("on: push"));
    }

    #[test]
    fn test_workflow_dispatch_only_ignores_parameter_name_prefixes() {
        // An input parameter that merely starts with a trigger word must not
        // defeat dispatch-only classification: "push_branch:" is not "push:",
        // and the inline check matches the whole trailing token only.
        let on = "on:\n  workflow_dispatch:\n    inputs:\n      push_branch:\n        type: string";
        assert!(is_workflow_dispatch_only(on));

        // A trailing inline trigger token still rules dispatch-only out.
        assert!(!is_workflow_dispatch_only("on: workflow_dispatch push"));
    }

    #[test]
    fn test_has_special_triggers() {
        assert!(has_special_triggers(&workflow_with_on("on:\n  issues:")));
        assert!(has_special_triggers(&workflow_with_on("on:\n  pull_request:")));
        assert!(has_special_triggers(&workflow_with_on("on:\n  discussion:")));
        assert!(has_special_triggers(&workflow_with_on("on:\n  push:")));
        assert!(has_special_triggers(&workflow_with_on("on: workflow_dispatch")));
        assert!(!has_special_triggers(&workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'")));
    }

    #[test]
    fn test_group_keys_for_command_trigger() {
        let workflow = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        let keys = build_concurrency_group_keys(&workflow, true);
        assert_eq!(keys[0], "gh-aw");
        assert_eq!(keys[1], "${{ github.workflow }}");
        assert_eq!(
            keys[2],
            "${{ github.event.issue.number || github.event.pull_request.number }}"
        );
    }

    #[test]
    fn test_group_keys_priority_order() {
        let pr_and_issue = workflow_with_on("on:\n  pull_request:\n  issues:");
        assert_eq!(
            build_concurrency_group_keys(&pr_and_issue, false).last().unwrap(),
            "${{ github.event.issue.number || github.event.pull_request.number }}"
        );

        let pr_and_discussion = workflow_with_on("on:\n  pull_request:\n  discussion:");
        assert_eq!(
            build_concurrency_group_keys(&pr_and_discussion, false).last().unwrap(),
            "${{ github.event.pull_request.number || github.event.discussion.number }}"
        );

        let issue_and_discussion = workflow_with_on("on:\n  issues:\n  discussion:");
        assert_eq!(
            build_concurrency_group_keys(&issue_and_discussion, false).last().unwrap(),
            "${{ github.event.issue.number || github.event.discussion.number }}"
        );

        let pr_only = workflow_with_on("on:\n  pull_request:\n    types: [opened]");
        assert_eq!(
            build_concurrency_group_keys(&pr_only, false).last().unwrap(),
            "${{ github.event.pull_request.number || github.ref }}"
        );

        let issue_only = workflow_with_on("on:\n  issues:");
        assert_eq!(
            build_concurrency_group_keys(&issue_only, false).last().unwrap(),
            "${{ github.event.issue.number }}"
        );

        let discussion_only = workflow_with_on("on:\n  discussion:");
        assert_eq!(
            build_concurrency_group_keys(&discussion_only, false).last().unwrap(),
            "${{ github.event.discussion.number }}"
        );

        let push_only = workflow_with_on("on:\n  push:\n    branches: [main]");
        assert_eq!(
            build_concurrency_group_keys(&push_only, false).last().unwrap(),
            "${{ github.ref }}"
        );

        // No correlation key for generic triggers like schedule
        let schedule = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        assert_eq!(build_concurrency_group_keys(&schedule, false).len(), 2);
    }

    #[test]
    fn test_cancel_in_progress_rules() {
        let pr = workflow_with_on("on:\n  pull_request:");
        assert!(should_enable_cancel_in_progress(&pr, false));
        // Never for command workflows, even when PR-triggered
        assert!(!should_enable_cancel_in_progress(&pr, true));
        let push = workflow_with_on("on:\n  push:");
        assert!(!should_enable_cancel_in_progress(&push, false));
        // Mixed PR shapes still cancel
        let mixed = workflow_with_on("on:\n  pull_request:\n  issues:");
        assert!(should_enable_cancel_in_progress(&mixed, false));
    }

    #[test]
    fn test_generate_concurrency_config_explicit_override_wins() {
        let mut workflow = workflow_with_on("on:\n  pull_request:");
        workflow.concurrency = "concurrency:\n  group: \"custom\"".to_string();
        let config = generate_concurrency_config(&workflow, false);
        assert_eq!(config, "concurrency:\n  group: \"custom\"");
        // Idempotent passthrough
        workflow.concurrency = config.clone();
        assert_eq!(generate_concurrency_config(&workflow, false), config);
    }

    #[test]
    fn test_generate_concurrency_config_pr_workflow() {
        let workflow = workflow_with_on("on:\n  pull_request:\n    types: [opened]");
        let config = generate_concurrency_config(&workflow, false);
        assert_eq!(
            config,
            "concurrency:\n  group: \"gh-aw-${{ github.workflow }}-${{ github.event.pull_request.number || github.ref }}\"\n  cancel-in-progress: true"
        );
    }

    #[test]
    fn test_generate_concurrency_config_schedule_workflow() {
        let workflow = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        let config = generate_concurrency_config(&workflow, false);
        assert_eq!(config, "concurrency:\n  group: \"gh-aw-${{ github.workflow }}\"");
    }

    #[test]
    fn test_generate_job_concurrency_engine_override_wins() {
        let mut workflow = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        workflow.engine = Some(EngineConfig {
            id: "claude".to_string(),
            concurrency: "concurrency:\n  group: \"mine\"".to_string(),
        });
        assert_eq!(
            generate_job_concurrency_config(&workflow),
            "concurrency:\n  group: \"mine\""
        );
    }

    #[test]
    fn test_generate_job_concurrency_suppressed_for_special_triggers() {
        let mut workflow = workflow_with_on("on:\n  issues:");
        workflow.engine = Some(EngineConfig {
            id: "claude".to_string(),
            concurrency: String::new(),
        });
        assert_eq!(generate_job_concurrency_config(&workflow), "");
    }

    #[test]
    fn test_generate_job_concurrency_requires_engine_id() {
        let workflow = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        assert_eq!(generate_job_concurrency_config(&workflow), "");
    }

    #[test]
    fn test_generate_job_concurrency_default_for_generic_triggers() {
        let mut workflow = workflow_with_on("on:\n  schedule:\n  - cron: '0 0 * * *'");
        workflow.engine = Some(EngineConfig {
            id: "claude".to_string(),
            concurrency: String::new(),
        });
        assert_eq!(
            generate_job_concurrency_config(&workflow),
            "concurrency:\n  group: \"gh-aw-claude-${{ github.workflow }}\""
        );
    }
}
