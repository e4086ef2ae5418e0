//! Build-time validation and inheritance merging.

use restkit::{
    ContractCatalog, ContractDef, ContractError, EndpointHeader, EndpointRegistry, HeaderTag,
    OperationDef, OperationKey, ParameterDef, ParameterTag, Tag, TypeDescriptor, VersionTag,
};
use serde_json::json;

fn registry(contracts: impl IntoIterator<Item = ContractDef>) -> EndpointRegistry {
    let mut catalog = ContractCatalog::new();
    for contract in contracts {
        catalog.register(contract).unwrap();
    }
    EndpointRegistry::builder(catalog).build()
}

fn three_level_chain() -> Vec<ContractDef> {
    vec![
        ContractDef::new("Root")
            .tag(Tag::Path("/root".to_owned()))
            .tag(Tag::Header(HeaderTag::new("X-Level", "root")))
            .operation(OperationDef::get("ping", "/ping")),
        ContractDef::new("Middle")
            .extends("Root")
            .tag(Tag::Path("/middle/".to_owned()))
            .tag(Tag::Header(HeaderTag::new("X-Level", "middle"))),
        ContractDef::new("Leaf")
            .extends("Middle")
            .tag(Tag::Path("leaf".to_owned()))
            .tag(Tag::Header(HeaderTag::new("X-Level", "leaf")))
            .tag(Tag::Header(HeaderTag::new("X-Level", "root")))
            .operation(
                OperationDef::get("find", "/{id}")
                    .tag(Tag::Header(HeaderTag::new("X-Op", "1")))
                    .param(ParameterDef::new("id", "String")),
            ),
    ]
}

#[test]
fn test_three_level_inheritance_order() {
    let registry = registry(three_level_chain());
    let descriptor = registry.descriptor("Leaf", "find").unwrap();

    assert_eq!(descriptor.path(), "/root/middle/leaf/{id}");
    assert_eq!(
        descriptor.headers(),
        &[
            EndpointHeader::new("X-Level", "root"),
            EndpointHeader::new("X-Level", "middle"),
            EndpointHeader::new("X-Level", "leaf"),
            EndpointHeader::new("X-Op", "1"),
        ]
    );

    let request = descriptor.expand(&[json!("9")]).unwrap();
    let levels: Vec<&str> = request
        .headers()
        .get_all("x-level")
        .iter()
        .map(|value| value.to_str().unwrap())
        .collect();
    assert_eq!(levels, ["root", "middle", "leaf"]);
}

#[test]
fn test_inherited_operation_uses_target_chain() {
    let registry = registry(three_level_chain());

    let through_leaf = registry.descriptor("Leaf", "ping").unwrap();
    assert_eq!(through_leaf.path(), "/root/middle/leaf/ping");
    assert_eq!(through_leaf.key().to_string(), "Leaf(Root)::ping()");

    let through_root = registry.descriptor("Root", "ping").unwrap();
    assert_eq!(through_root.path(), "/root/ping");
    assert_ne!(through_leaf.key(), through_root.key());
}

#[test]
fn test_descriptors_lists_inherited_operations() {
    let registry = registry(three_level_chain());
    let keys: Vec<String> = registry
        .descriptors("Leaf")
        .unwrap()
        .iter()
        .map(|descriptor| descriptor.key().to_string())
        .collect();
    assert_eq!(keys, ["Leaf(Root)::ping()", "Leaf::find(String)"]);
    assert_eq!(registry.cache().len(), 2);
}

#[test]
fn test_two_parents_fail() {
    let registry = registry([
        ContractDef::new("A"),
        ContractDef::new("B"),
        ContractDef::new("C")
            .extends("A")
            .extends("B")
            .operation(OperationDef::get("op", "/op")),
    ]);
    assert!(matches!(
        registry.descriptor("C", "op").unwrap_err(),
        ContractError::MultipleParents { ref contract, .. } if contract == "C"
    ));
}

#[test]
fn test_two_bodies_fail() {
    let registry = registry([ContractDef::new("Api").operation(
        OperationDef::post("op", "/op")
            .param(ParameterDef::new("a", "A").tag(ParameterTag::Body))
            .param(ParameterDef::new("b", "B").tag(ParameterTag::Body)),
    )]);
    assert!(matches!(
        registry.descriptor("Api", "op").unwrap_err(),
        ContractError::MultipleBodyParameters { first: 0, second: 1, .. }
    ));
}

#[test]
fn test_missing_verb_fails() {
    let registry = registry([ContractDef::new("Api")
        .operation(OperationDef::new("op").tag(Tag::Path("/op".to_owned())))]);
    let err = registry.descriptor("Api", "op").unwrap_err();
    assert!(matches!(err, ContractError::MissingHttpMethod { .. }));
    assert_eq!(err.to_string(), "operation Api::op() declares no HTTP method");
}

#[test]
fn test_failed_builds_are_not_cached() {
    let registry = registry([ContractDef::new("Api").operation(OperationDef::new("op"))]);
    assert!(registry.descriptor("Api", "op").is_err());
    assert!(registry.cache().is_empty());
    assert!(registry.descriptor("Api", "op").is_err());
}

#[test]
fn test_repeated_name_lookups_share_one_descriptor() {
    let registry = registry(three_level_chain());
    let first = registry.descriptor("Leaf", "ping").unwrap();
    for _ in 0..3 {
        assert!(std::sync::Arc::ptr_eq(&first, &registry.descriptor("Leaf", "ping").unwrap()));
    }
    let by_key = registry.operation_key("Leaf", "ping").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &registry.descriptor_for(&by_key).unwrap()));

    let through_root = registry.descriptor("Root", "ping").unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &through_root));
    assert_eq!(registry.cache().len(), 2);
}

#[test]
fn test_unknown_and_ambiguous_operations() {
    let registry = registry([ContractDef::new("Api")
        .operation(OperationDef::get("find", "/a").param(ParameterDef::new("id", "String")))
        .operation(OperationDef::get("find", "/b").param(ParameterDef::new("id", "int")))]);

    let err = registry.descriptor("Api", "missing").unwrap_err();
    assert!(matches!(err, ContractError::UnknownOperation { .. }));
    assert_eq!(err.to_string(), "contract 'Api' has no operation 'missing'");
    assert!(registry.descriptor("Api", "missing").is_err());
    assert!(matches!(
        registry.descriptor("Api", "find").unwrap_err(),
        ContractError::AmbiguousOperation { .. }
    ));

    let key = OperationKey::new("Api", "Api", "find", vec![TypeDescriptor::new("int")]);
    assert_eq!(registry.descriptor_for(&key).unwrap().path(), "/b");
}

#[test]
fn test_unknown_contract() {
    let registry = registry(std::iter::empty::<ContractDef>());
    assert_eq!(
        registry.descriptor("Nope", "op").unwrap_err(),
        ContractError::UnknownContract("Nope".to_owned())
    );
}

#[test]
fn test_operation_version_overrides_contract_version() {
    let registry = registry([ContractDef::new("Api")
        .tag(Tag::Version(VersionTag::new("v1").in_uri()))
        .operation(OperationDef::get("old", "/things"))
        .operation(OperationDef::get("new", "/things").tag(Tag::Version(VersionTag::new("v2").in_uri())))]);

    let old = registry.descriptor("Api", "old").unwrap();
    assert_eq!(old.path(), "/v1/things");
    assert_eq!(old.version(), Some("v1"));

    let new = registry.descriptor("Api", "new").unwrap();
    assert_eq!(new.path(), "/v2/things");
    assert_eq!(new.version(), Some("v2"));
}
