use factcheck_core::core_types::TargetId;
use factcheck_core::error::{CoreError, Result};
use factcheck_core::expectation::{Expectation, ExpectationTable};
use factcheck_core::fact_map::FactMap;
use factcheck_core::report::EvaluationResult;
use std::collections::HashMap;
use tracing::debug;

/// 按表顺序评估单个目标的全部期望
///
/// 只有通过的期望才会登记为已解析事实，供后续路径模板使用；
/// 前置事实缺失、为空或未通过时，依赖它的期望记为跳过。
pub fn evaluate_table(
    target_id: &TargetId,
    table: &ExpectationTable,
    facts: &FactMap,
) -> Vec<EvaluationResult> {
    let mut resolved: HashMap<String, String> = HashMap::new();
    let mut results = Vec::with_capacity(table.len());

    for expectation in table {
        let expected = expectation.matcher.render();

        let path = match resolve_path(expectation, &resolved) {
            Ok(path) => path,
            Err(err) => {
                debug!(
                    target_id = %target_id,
                    path = %expectation.path,
                    error = %err,
                    "Skipping expectation with unresolved prerequisite"
                );
                results.push(EvaluationResult::skipped(
                    target_id.clone(),
                    expectation.section,
                    expectation.path.to_string(),
                    expected,
                    &err,
                ));
                continue;
            }
        };

        let result = match facts.resolve(&path) {
            Ok(actual) => {
                let passed = expectation.matcher.evaluate(actual);
                if passed {
                    resolved.insert(path.clone(), actual.to_string());
                } else {
                    debug!(
                        target_id = %target_id,
                        path = %path,
                        expected = %expected,
                        actual = %actual,
                        "Fact mismatch"
                    );
                }
                EvaluationResult::matched(
                    target_id.clone(),
                    expectation.section,
                    path,
                    expected,
                    actual,
                    passed,
                )
            }
            Err(_) => {
                debug!(target_id = %target_id, path = %path, "Fact path not found");
                EvaluationResult::not_found(target_id.clone(), expectation.section, path, expected)
            }
        };
        results.push(result);
    }

    results
}

/// 前置事实必须已在本目标中通过，才能渲染依赖路径
fn resolve_path(expectation: &Expectation, resolved: &HashMap<String, String>) -> Result<String> {
    if let Some(missing) = expectation
        .prerequisites()
        .find(|fact| !resolved.contains_key(*fact))
    {
        return Err(CoreError::unresolved_dependency(
            expectation.path.to_string(),
            missing,
        ));
    }
    expectation.path.render(resolved)
}
