//! 사람이 읽는 추천 근거 문장.

use std::collections::BTreeMap;

use advisor_core::{
    Component, IndicatorName, IndicatorSet, PatternBias, SignalState, StructureLevels,
};

/// 구성 요소 점수, RSI 극단값, 감지된 패턴, 제외된 구성 요소를 설명합니다.
///
/// RSI 과매수/과매도 판단은 지표 계산 시 설정 임계값으로 분류된 상태를 따릅니다.
pub(super) fn build(
    scores: &BTreeMap<Component, f64>,
    excluded: &[Component],
    indicators: &IndicatorSet,
    structure: &StructureLevels,
) -> Vec<String> {
    let mut reasons = Vec::new();

    for (component, score) in scores {
        let (strong, weak) = match component {
            Component::Technical => (65.0, 35.0),
            _ => (60.0, 40.0),
        };
        let message = if *score > strong {
            match component {
                Component::Technical => "기술적 지표가 상승 흐름을 지지합니다",
                Component::Ml => "ML 모델이 가격 상승을 예측합니다",
                Component::Momentum => "가격과 거래량의 모멘텀이 강합니다",
                Component::Risk => "변동성과 구조 대비 위험이 낮습니다",
                Component::Volume => "거래량이 가격 움직임을 확인합니다",
            }
        } else if *score < weak {
            match component {
                Component::Technical => "기술적 지표가 하락 압력을 시사합니다",
                Component::Ml => "ML 모델이 가격 하락 가능성을 보입니다",
                Component::Momentum => "모멘텀이 약해 주의가 필요합니다",
                Component::Risk => "위험이 높아 포지션 규모에 주의가 필요합니다",
                Component::Volume => "거래량이 약해 움직임이 제한될 수 있습니다",
            }
        } else {
            continue;
        };
        reasons.push(format!("{} ({:.1}점)", message, score));
    }

    if let Some(rsi) = indicators.value(IndicatorName::Rsi14) {
        match indicators.state(IndicatorName::Rsi14) {
            Some(SignalState::Overbought) => {
                reasons.push(format!("RSI {:.1}: 과매수 구간, 차익 실현 고려", rsi))
            }
            Some(SignalState::Oversold) => {
                reasons.push(format!("RSI {:.1}: 과매도 구간, 반등 가능성", rsi))
            }
            _ => {}
        }
    }

    for pattern in &structure.patterns {
        let direction = match pattern.kind.bias() {
            PatternBias::Bullish => "상승",
            PatternBias::Bearish => "하락",
            PatternBias::Neutral => "중립",
        };
        reasons.push(format!(
            "{} 패턴 감지 ({} 신호, 신뢰도 {:.0}%)",
            pattern.kind.label(),
            direction,
            pattern.confidence * 100.0
        ));
    }

    if !excluded.is_empty() {
        let names: Vec<&str> = excluded.iter().map(|c| c.korean_name()).collect();
        reasons.push(format!("입력 없음으로 제외: {}", names.join(", ")));
    }

    if reasons.is_empty() {
        reasons.push("신호가 엇갈려 중립 관점을 유지합니다".to_string());
    }

    reasons
}
