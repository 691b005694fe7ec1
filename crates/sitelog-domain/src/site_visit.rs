//! Built-in schema for logging real-estate site visits.

use crate::field::{FieldKind, FieldRole, FieldSpec, VisibilityRule};
use crate::schema::{Schema, SchemaError};

pub const PROPERTY_TYPES: [&str; 5] = ["아파트", "빌라", "오피스텔", "상가", "토지"];
pub const LAND_TYPE: &str = "토지";

fn options(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// The default site-visit questionnaire. Floor is asked for buildings only and
/// land use for land only.
pub fn site_visit_schema() -> Result<Schema, SchemaError> {
    Schema::new(vec![
        FieldSpec::new("date", "방문일", FieldKind::Date).with_role(FieldRole::VisitDate),
        FieldSpec::new("name", "매물명", FieldKind::Text).with_role(FieldRole::Name),
        FieldSpec::new("address", "주소", FieldKind::Text)
            .with_optional()
            .with_role(FieldRole::Address),
        FieldSpec::new("type", "유형", FieldKind::SingleSelect(options(&PROPERTY_TYPES)))
            .with_role(FieldRole::Category),
        FieldSpec::new("price", "가격(만원)", FieldKind::Number)
            .with_role(FieldRole::Price)
            .with_help("매매가 또는 보증금, 만원 단위"),
        FieldSpec::new("area", "면적(㎡)", FieldKind::Number).with_optional(),
        FieldSpec::new("floor", "층", FieldKind::Number)
            .with_optional()
            .with_visibility(VisibilityRule::hidden_when("type", [LAND_TYPE])),
        FieldSpec::new(
            "land_use",
            "지목",
            FieldKind::SingleSelect(options(&["대지", "전", "답", "임야", "잡종지"])),
        )
        .with_optional()
        .with_visibility(VisibilityRule::shown_when("type", [LAND_TYPE])),
        FieldSpec::new(
            "rating",
            "종합 평가",
            FieldKind::SingleSelect(options(&["상", "중", "하"])),
        )
        .with_optional(),
        FieldSpec::new("comment", "메모", FieldKind::LongText)
            .with_optional()
            .with_role(FieldRole::Commentary),
    ])
}
