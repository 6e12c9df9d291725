//! 지원 전략 목록 명령어.

use trader_strategy::{ParameterDefault, ParameterSpec, StrategyMeta};

fn format_default(default: &ParameterDefault) -> String {
    match default {
        ParameterDefault::Integer(v) => v.to_string(),
        ParameterDefault::Float(v) => v.to_string(),
        ParameterDefault::Text(v) => v.to_string(),
        ParameterDefault::Boolean(v) => v.to_string(),
    }
}

/// 파라미터 한 줄 설명.
fn describe_parameter(spec: &ParameterSpec) -> String {
    let mut line = format!(
        "  - {} ({:?}, 기본값 {}): {}",
        spec.name,
        spec.kind,
        format_default(&spec.default),
        spec.description
    );
    if let Some((min, max)) = spec.range {
        line.push_str(&format!(" [{} ~ {}]", min, max));
    }
    if !spec.options.is_empty() {
        line.push_str(&format!(" {{{}}}", spec.options.join(", ")));
    }
    line
}

/// 전략 카탈로그를 사람이 읽는 형식으로 출력합니다.
pub fn print_strategies(strategies: &[StrategyMeta]) {
    println!("지원 전략 ({}개)", strategies.len());
    for meta in strategies {
        println!("\n{} - {}", meta.id, meta.name);
        println!("  {}", meta.description);
        for spec in meta.parameters {
            println!("{}", describe_parameter(spec));
        }
    }
}
