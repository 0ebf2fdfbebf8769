// Copyright (c) The fpk-layout contributors.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/fpk-layout/fpk-layout

use fpk_ident::{FeaturePackLocation, ProducerName, UniverseName};
use rstest::rstest;

use super::*;

fn loc(producer: &str) -> FeaturePackLocation {
    FeaturePackLocation::full(
        UniverseName::new("acme").unwrap(),
        ProducerName::new(producer).unwrap(),
    )
}

#[rstest]
fn builder_appends_and_replaces_direct_entries() {
    let cfg = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(loc("a")))
        .append_direct(FeaturePackConfig::new(loc("b")))
        .build();
    assert_eq!(cfg.direct_entries().len(), 2);

    let producer_b = cfg.direct_entries()[1].producer_spec().unwrap();
    let cfg2 = cfg
        .to_builder()
        .set_direct(FeaturePackConfig::new(loc("b")).with_patch(
            fpk_ident::FeaturePackId {
                universe: UniverseName::new("acme").unwrap(),
                producer: ProducerName::new("patch-b").unwrap(),
                channel: fpk_ident::ChannelName::new("stable").unwrap(),
                frequency: None,
                build: fpk_ident::Build::new("1"),
            },
        ))
        .build();
    assert_eq!(cfg2.direct_entries().len(), 2);
    assert_eq!(
        cfg2.get_direct(&producer_b).unwrap().patches.len(),
        1,
        "set_direct should replace in place, not duplicate"
    );
}

#[rstest]
fn remove_direct_drops_matching_entry_only() {
    let cfg = ProvisioningConfig::builder()
        .append_direct(FeaturePackConfig::new(loc("a")))
        .append_direct(FeaturePackConfig::new(loc("b")))
        .build();
    let producer_a = cfg.direct_entries()[0].producer_spec().unwrap();
    let cfg = cfg.to_builder().remove_direct(&producer_a).build();
    assert_eq!(cfg.direct_entries().len(), 1);
    assert_eq!(cfg.direct_entries()[0].producer_spec().unwrap().producer.as_str(), "b");
}

#[rstest]
fn convergence_policy_defaults_to_first_processed() {
    let cfg = ProvisioningConfig::builder().build();
    assert_eq!(
        cfg.convergence_policy().unwrap(),
        ConvergencePolicy::FirstProcessed
    );
}

#[rstest]
fn convergence_policy_rejects_unknown_value() {
    let cfg = ProvisioningConfig::builder()
        .set_option(VERSION_CONVERGENCE.to_string(), "YOLO".to_string())
        .build();
    assert!(cfg.convergence_policy().is_err());
}
