use super::*;

#[test]
fn later_duplicate_wins() {
    let yaml = r#"
- name: a
  namespace: ns1
- name: a
  namespace: ns2
"#;
    let mapping = TargetMapping::resolve(Some(yaml)).unwrap();
    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.namespace("a"), Some("ns2"));
}

#[test]
fn one_entry_per_distinct_name() {
    let specs = vec![
        TargetSpec::new("a", "ns1"),
        TargetSpec::new("b", "ns1"),
        TargetSpec::new("c", "ns2"),
        TargetSpec::new("b", "ns3"),
    ];
    let mapping = TargetMapping::from_specs(specs).unwrap();
    assert_eq!(mapping.len(), 3);
    assert_eq!(mapping.namespace("a"), Some("ns1"));
    assert_eq!(mapping.namespace("b"), Some("ns3"));
    assert_eq!(mapping.namespace("c"), Some("ns2"));
    assert_eq!(mapping.namespace("d"), None);

    let mut names = mapping.iter().map(|(name, _)| name).collect::<Vec<_>>();
    names.sort_unstable();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn flow_style_list() {
    let yaml = "[{name: kube-root-ca.crt, namespace: default}, {name: coredns, namespace: kube-system}]";
    let mapping = TargetMapping::resolve(Some(yaml)).unwrap();
    assert_eq!(mapping.namespace("coredns"), Some("kube-system"));
    assert_eq!(mapping.namespace("kube-root-ca.crt"), Some("default"));
}

#[test]
fn absent_source_is_a_configuration_error() {
    let err = TargetMapping::resolve(None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingTargets));
    assert!(err.is_target_list());
}

#[test]
fn blank_source_is_a_configuration_error() {
    let err = TargetMapping::resolve(Some("  \n ")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingTargets));
}

#[test]
fn empty_list_is_a_configuration_error() {
    let err = TargetMapping::resolve(Some("[]")).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyTargets));
}

#[test]
fn missing_field_is_rejected() {
    let err = TargetMapping::resolve(Some("- name: a")).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedTargets(_)));
}

#[test]
fn blank_namespace_is_rejected() {
    let yaml = r#"
- name: a
  namespace: ns1
- name: b
  namespace: ""
"#;
    let err = TargetMapping::resolve(Some(yaml)).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::IncompleteTarget {
            index: 1,
            field: "namespace"
        }
    ));
}

#[test]
fn not_a_list() {
    let err = TargetMapping::resolve(Some("name: a\nnamespace: ns1")).unwrap_err();
    assert!(matches!(err, ConfigError::MalformedTargets(_)));
}
