use super::expr::ScaleExpr;
use super::rules::compile_rules;
use crate::config::{Config, OutputMode, QuestionKind};
use std::collections::BTreeSet;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
///
/// Errors are the structural problems that make scoring meaningless; the
/// softer findings (unresolvable references, ambiguous rules) come from
/// [`config_warnings`] and never block a run.
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.dimensions.is_empty() {
        errors.push("dimensions: at least one dimension is required".to_string());
    }
    let mut seen_dims = BTreeSet::new();
    for dim in &config.dimensions {
        if !seen_dims.insert(dim) {
            errors.push(format!("dimensions: duplicate name \"{}\"", dim));
        }
    }

    if config.questions.is_empty() {
        errors.push("questions: at least one question is required".to_string());
    }
    let mut seen_ids = BTreeSet::new();
    for question in &config.questions {
        let id = &question.id;
        if id.is_empty() {
            errors.push("questions: empty id".to_string());
        }
        if !seen_ids.insert(id) {
            errors.push(format!("questions[{}]: duplicate id", id));
        }
        if question.prompt.is_empty() {
            errors.push(format!("questions[{}]: missing prompt", id));
        }

        match question.kind {
            QuestionKind::Scale => {
                match &question.scale {
                    None => errors.push(format!("questions[{}]: scale requires a scale range", id)),
                    Some(spec) => {
                        if !spec.min.is_finite() || !spec.max.is_finite() || spec.min >= spec.max {
                            errors.push(format!(
                                "questions[{}].scale: min must be a finite number below max",
                                id
                            ));
                        }
                    }
                }
                match &question.weights {
                    None => errors.push(format!(
                        "questions[{}]: scale requires weights (e.g., {{dim: \"scale(-1,+1)\"}})",
                        id
                    )),
                    Some(weights) => {
                        for (dim, expr) in weights {
                            if let Err(e) = ScaleExpr::parse(expr) {
                                errors.push(format!(
                                    "questions[{}].weights.{}: invalid '{}' - {}",
                                    id, dim, expr, e
                                ));
                            }
                        }
                    }
                }
            }
            QuestionKind::Single | QuestionKind::Multi => {
                if question.options.is_empty() {
                    errors.push(format!("questions[{}]: requires options", id));
                }
                for (i, option) in question.options.iter().enumerate() {
                    if option.label.is_empty() {
                        errors.push(format!("questions[{}].options[{}]: missing label", id, i));
                    }
                }
            }
            QuestionKind::Open => {
                if let Some(spec) = &question.keywords {
                    if spec.keysets.is_empty() {
                        errors.push(format!("questions[{}].keywords: keysets is empty", id));
                    }
                    if spec.map.is_empty() {
                        errors.push(format!("questions[{}].keywords: map is empty", id));
                    }
                }
            }
        }
    }

    if config.output.mode == OutputMode::Profile {
        let range = config.output.range;
        if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
            errors.push("output.range: min must be a finite number below max".to_string());
        }
    }

    if config.output.mode == OutputMode::Archetypes && config.archetypes.is_empty() {
        errors.push("archetypes: required when output.mode is archetypes".to_string());
    }
    let mut seen_keys = BTreeSet::new();
    for archetype in &config.archetypes {
        if archetype.key.is_empty() {
            errors.push("archetypes: empty key".to_string());
        }
        if !seen_keys.insert(&archetype.key) {
            errors.push(format!("archetypes[{}]: duplicate key", archetype.key));
        }
        if archetype.vector.is_empty() {
            errors.push(format!("archetypes[{}]: vector is empty", archetype.key));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Collect the non-fatal configuration findings: references that will be
/// ignored at scoring time and rules that cannot behave as written.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    let declared: BTreeSet<&str> = config.dimensions.iter().map(String::as_str).collect();

    let check_bucket = |context: String, bucket: &str, warnings: &mut Vec<String>| {
        if !declared.contains(bucket) {
            warnings.push(format!(
                "{}: undeclared dimension \"{}\" will be ignored",
                context, bucket
            ));
        }
    };

    for question in &config.questions {
        let id = &question.id;
        if let Some(weights) = &question.weights {
            for dim in weights.keys() {
                check_bucket(format!("questions[{}].weights", id), dim, &mut warnings);
            }
        }
        for (i, option) in question.options.iter().enumerate() {
            for bucket in option.boosts.keys() {
                check_bucket(
                    format!("questions[{}].options[{}].boosts", id, i),
                    bucket,
                    &mut warnings,
                );
            }
        }
        if let Some(spec) = &question.keywords {
            for (i, rule) in spec.map.iter().enumerate() {
                if !spec.keysets.contains_key(&rule.keys) {
                    warnings.push(format!(
                        "questions[{}].keywords.map[{}]: unknown keyset \"{}\"",
                        id, i, rule.keys
                    ));
                }
                for bucket in rule.boosts.keys() {
                    check_bucket(
                        format!("questions[{}].keywords.map[{}].boosts", id, i),
                        bucket,
                        &mut warnings,
                    );
                }
            }
        }
        if question.max_select.is_some() && question.kind != QuestionKind::Multi {
            warnings.push(format!(
                "questions[{}]: max_select has no effect on {:?} questions",
                id, question.kind
            ));
        }
    }

    // Rule compilation already diagnoses ambiguous shapes, bad references
    // and malformed thresholds.
    let (compiled, rule_warnings) =
        compile_rules(&config.questions, &config.dimensions, &config.rules);
    warnings.extend(rule_warnings);
    for rule in &compiled {
        for (bucket, _) in &rule.adjust {
            check_bucket(format!("{}.adjust", rule.label), bucket, &mut warnings);
        }
    }

    for archetype in &config.archetypes {
        for tag in archetype.vector.keys() {
            check_bucket(
                format!("archetypes[{}].vector", archetype.key),
                tag,
                &mut warnings,
            );
        }
    }
    if config.output.mode == OutputMode::Profile && !config.archetypes.is_empty() {
        warnings.push(
            "archetypes: declared but unused while output.mode is profile".to_string(),
        );
    }

    warnings
}
