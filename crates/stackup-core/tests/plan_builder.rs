//! Tests for building deployment plans from application descriptions.

use stackup_core::app::{
    AppDescription, ExternalRef, NetworkDefinition, ServiceDefinition, VolumeAttachment,
    VolumeDefinition,
};
use stackup_core::error::PlanError;
use stackup_core::plan::{BuildOptions, PlanBuilder, PortPolicy, build_plan};
use stackup_core::translate::{MountKind, PortMapping, PortSpecError};

fn shop_app() -> AppDescription {
    AppDescription::new().with_service("web", ServiceDefinition::new("nginx").with_port("8080:80"))
}

fn multi_network_app() -> AppDescription {
    AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_network("back", NetworkDefinition::with_driver("bridge"))
        .with_network("legacy-net", NetworkDefinition::external(ExternalRef::external()))
        .with_network(
            "shared",
            NetworkDefinition::external(ExternalRef::external_named("corp_shared")),
        )
        .with_volume("data", VolumeDefinition::default())
        .with_service(
            "api",
            ServiceDefinition::new("example/api")
                .with_network("front")
                .with_network("back")
                .with_network("shared")
                .with_port("80")
                .with_volume(VolumeAttachment::named("data", "/var/lib/api")),
        )
        .with_service(
            "worker",
            ServiceDefinition::new("example/worker").with_network("back"),
        )
}

// =========================================================================
// Concrete scenarios
// =========================================================================

#[test]
fn single_service_without_networks_gets_default_network() {
    let plan = build_plan("shop", &shop_app()).unwrap();

    assert_eq!(plan.networks.len(), 1);
    let default = plan.network("default").unwrap();
    assert_eq!(default.real_name, "shop_default");
    assert_eq!(default.driver, "overlay");
    assert!(!default.external);

    let web = plan.service("web").unwrap();
    assert_eq!(web.real_name, "shop_web");
    assert_eq!(web.image, "nginx");
    assert_eq!(web.ports, vec![PortMapping::published(8080, 80)]);
    assert_eq!(web.network_refs, vec!["shop_default".to_string()]);
}

#[test]
fn target_only_port_has_no_published_port() {
    let app = AppDescription::new()
        .with_service("web", ServiceDefinition::new("nginx").with_port("80"));
    let plan = build_plan("shop", &app).unwrap();

    let web = plan.service("web").unwrap();
    assert_eq!(web.ports, vec![PortMapping { published: None, target: 80 }]);
}

#[test]
fn external_network_keeps_logical_name() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    let legacy = plan.network("legacy-net").unwrap();
    assert_eq!(legacy.real_name, "legacy-net");
    assert!(legacy.external);
}

// =========================================================================
// Namespacing and resolution
// =========================================================================

#[test]
fn owned_resources_are_namespaced() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    assert_eq!(plan.network("front").unwrap().real_name, "shop_front");
    assert_eq!(plan.network("back").unwrap().real_name, "shop_back");
    assert_eq!(plan.network("shared").unwrap().real_name, "corp_shared");
    for service in plan.services.values() {
        assert_eq!(service.real_name, format!("shop_{}", service.logical_name));
    }
}

#[test]
fn declared_driver_is_kept() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    assert_eq!(plan.network("back").unwrap().driver, "bridge");
    assert_eq!(plan.network("front").unwrap().driver, "overlay");
}

#[test]
fn network_refs_resolve_to_real_names() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    let api = plan.service("api").unwrap();
    assert_eq!(api.network_refs, vec!["shop_front", "shop_back", "corp_shared"]);

    for service in plan.services.values() {
        for reference in &service.network_refs {
            assert!(
                plan.networks.values().any(|n| &n.real_name == reference),
                "dangling reference {}",
                reference
            );
        }
    }
}

#[test]
fn unresolved_network_fails_build() {
    let app = AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_service("web", ServiceDefinition::new("nginx").with_network("missing"));

    let err = build_plan("shop", &app).unwrap_err();
    assert_eq!(
        err,
        PlanError::UnresolvedNetwork {
            service: "web".to_string(),
            network: "missing".to_string(),
        }
    );
}

#[test]
fn reference_to_default_without_declaration_fails() {
    // The synthesized default network does not make other names resolvable.
    let app = AppDescription::new()
        .with_service("web", ServiceDefinition::new("nginx").with_network("front"));

    assert!(matches!(
        build_plan("shop", &app),
        Err(PlanError::UnresolvedNetwork { .. })
    ));
}

#[test]
fn duplicate_real_names_fail_build() {
    let app = AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_network(
            "alias",
            NetworkDefinition::external(ExternalRef::external_named("shop_front")),
        )
        .with_service("web", ServiceDefinition::new("nginx").with_network("front"));

    let err = build_plan("shop", &app).unwrap_err();
    assert!(matches!(
        err,
        PlanError::DuplicateNetworkName { ref real_name, .. } if real_name == "shop_front"
    ));
}

// =========================================================================
// Implicit attachment
// =========================================================================

#[test]
fn service_without_networks_attaches_to_only_declared_network() {
    let app = AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_service("web", ServiceDefinition::new("nginx"));

    let plan = build_plan("shop", &app).unwrap();
    assert!(plan.network("default").is_none());
    assert_eq!(plan.service("web").unwrap().network_refs, vec!["shop_front"]);
}

#[test]
fn service_without_networks_stays_detached_when_ambiguous() {
    let app = AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_network("back", NetworkDefinition::default())
        .with_service("web", ServiceDefinition::new("nginx"));

    let plan = build_plan("shop", &app).unwrap();
    assert!(plan.service("web").unwrap().network_refs.is_empty());
}

#[test]
fn service_without_networks_prefers_declared_default_network() {
    let app = AppDescription::new()
        .with_network("default", NetworkDefinition::default())
        .with_network("back", NetworkDefinition::default())
        .with_service("web", ServiceDefinition::new("nginx"))
        .with_service("worker", ServiceDefinition::new("example/worker").with_network("back"));

    let plan = build_plan("shop", &app).unwrap();
    assert_eq!(plan.service("web").unwrap().network_refs, vec!["shop_default"]);
    assert_eq!(plan.service("worker").unwrap().network_refs, vec!["shop_back"]);
}

#[test]
fn repeated_network_reference_is_attached_once() {
    let app = AppDescription::new()
        .with_network("front", NetworkDefinition::default())
        .with_service(
            "web",
            ServiceDefinition::new("nginx")
                .with_network("front")
                .with_network("front"),
        );

    let plan = build_plan("shop", &app).unwrap();
    assert_eq!(plan.service("web").unwrap().network_refs, vec!["shop_front"]);
}

// =========================================================================
// Translation
// =========================================================================

#[test]
fn volumes_become_target_mounts_and_are_reported() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    let api = plan.service("api").unwrap();
    assert_eq!(api.mounts.len(), 1);
    assert_eq!(api.mounts[0].kind, MountKind::Volume);
    assert_eq!(api.mounts[0].target, "/var/lib/api");

    let data = &plan.volumes["data"];
    assert_eq!(data.logical_name, "data");
    assert!(!data.external);
}

#[test]
fn passthrough_fields_are_copied() {
    let app = AppDescription::new().with_service(
        "job",
        ServiceDefinition::new("busybox")
            .with_command(["sh", "-c", "echo hi"])
            .with_env("MODE=batch"),
    );

    let plan = build_plan("shop", &app).unwrap();
    let job = plan.service("job").unwrap();
    assert_eq!(job.command, vec!["sh", "-c", "echo hi"]);
    assert_eq!(job.environment, vec!["MODE=batch"]);
}

#[test]
fn strict_policy_rejects_malformed_port() {
    let app = AppDescription::new()
        .with_service("web", ServiceDefinition::new("nginx").with_port("http:80"));

    let err = build_plan("shop", &app).unwrap_err();
    assert_eq!(
        err,
        PlanError::InvalidPort {
            service: "web".to_string(),
            source: PortSpecError::InvalidNumber {
                spec: "http:80".to_string(),
                component: "http".to_string(),
            },
        }
    );
}

#[test]
fn lenient_policy_zeroes_malformed_port_and_warns() {
    let app = AppDescription::new()
        .with_service("web", ServiceDefinition::new("nginx").with_port("http:80"));

    let plan = PlanBuilder::new("shop")
        .with_options(BuildOptions {
            port_policy: PortPolicy::Lenient,
        })
        .build(&app)
        .unwrap();

    assert_eq!(
        plan.service("web").unwrap().ports,
        vec![PortMapping::published(0, 80)]
    );
    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings[0].contains("web"));
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn building_twice_yields_identical_plans() {
    let app = multi_network_app();
    let first = build_plan("shop", &app).unwrap();
    let second = build_plan("shop", &app).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn plans_iterate_in_logical_name_order() {
    let plan = build_plan("shop", &multi_network_app()).unwrap();

    let names: Vec<&str> = plan.networks.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["back", "front", "legacy-net", "shared"]);
}
