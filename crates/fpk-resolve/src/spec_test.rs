// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use fpk_ident::{ProducerName, UniverseName};
use rstest::rstest;

use super::*;

fn loc(producer: &str) -> FeaturePackLocation {
    FeaturePackLocation::full(
        UniverseName::new("acme").unwrap(),
        ProducerName::new(producer).unwrap(),
    )
}

#[rstest]
fn replacing_a_dependency_preserves_order() {
    let spec = FeaturePackSpec {
        direct_deps: vec![
            DeclaredDependency::new(loc("a"), false),
            DeclaredDependency::new(FeaturePackLocation::coordinate("coord:b"), false),
            DeclaredDependency::new(loc("c"), false),
        ],
        ..Default::default()
    };
    let rebuilt = spec.with_dependency_replaced(
        &FeaturePackLocation::coordinate("coord:b"),
        loc("b-resolved"),
    );
    let names: Vec<_> = rebuilt
        .direct_deps
        .iter()
        .map(|d| d.location.producer_spec().map(|p| p.producer.to_string()))
        .collect();
    assert_eq!(
        names,
        vec![
            Some("a".to_string()),
            Some("b-resolved".to_string()),
            Some("c".to_string()),
        ]
    );
}
