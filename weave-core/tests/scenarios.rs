mod common;

use common::*;
use weave_core::{ArtifactKind, CrossMixinPolicy, DiagnosticCode, Resolver, ResolverOptions, Severity};
use weave_model::{Accessibility, Body, Snapshot, TypeDeclaration, TypeRef};

fn resolve(types: Vec<TypeDeclaration>) -> weave_core::Resolution {
    Resolver::default().resolve(&Snapshot::new(types))
}

#[test]
fn mixin_a_exposes_public_contract_only() {
    let mut a = mixin("A");
    a.members = vec![
        auto_property("int", "X", None),
        method(Accessibility::Private, "void", "Secret", "hidden();"),
        abstract_method("bool", "Do"),
    ];
    let c = consumer("C", &[uses("A")]);

    let resolution = resolve(vec![a, c]);
    assert!(resolution.diagnostics.is_empty());

    let iface = resolution.artifact("Sample.I_MxA.g.cs").expect("interface artifact");
    assert_eq!(iface.kind, ArtifactKind::Interface);
    assert_eq!(
        iface.contents,
        "// <auto-generated/>\n\nnamespace Sample;\n\npublic interface I_MxA\n{\n    int X { get; set; }\n\n    bool Do();\n}\n"
    );

    let aug = resolution.artifact("Sample.C.UseMixins.g.cs").expect("augmentation artifact");
    assert_eq!(
        aug.contents,
        "// <auto-generated/>\nusing System;\n\nnamespace Sample;\n\npublic partial class C : Sample.I_MxA\n{\n    public int X { get; set; }\n\n    private void Secret()\n    {\n        hidden();\n    }\n}\n"
    );
}

#[test]
fn mixin_b_makes_consumer_disposable_without_redeclaring() {
    let mut b = mixin("B");
    b.interfaces = vec![TypeRef::named("System.IDisposable")];
    b.members = vec![
        method(Accessibility::Public, "void", "Dispose", "closed = true;"),
        method(Accessibility::Public, "void", "Close", "Dispose();"),
    ];
    let host = consumer("Host", &[uses("B")]);

    let resolution = resolve(vec![disposable(), b, host]);
    assert!(resolution.diagnostics.is_empty());

    let iface = &resolution.interfaces[0];
    assert_eq!(iface.member_names(), vec!["Close"]);
    assert_eq!(iface.bases, vec![TypeRef::named("System.IDisposable")]);

    let aug = &resolution.augmentations[0];
    let interfaces: Vec<String> = aug.interfaces.iter().map(TypeRef::display).collect();
    assert_eq!(interfaces, vec!["System.IDisposable", "Sample.I_MxB"]);
    let names: Vec<&str> = aug.members.iter().map(|c| c.member.name.as_str()).collect();
    assert_eq!(names, vec!["Dispose", "Close"]);
}

#[test]
fn conflicting_member_is_reported_once_and_not_duplicated() {
    let mut e = mixin("E");
    e.members = vec![
        method(Accessibility::Public, "void", "Foo", "fromMixin();"),
        method(Accessibility::Public, "void", "Bar", "bar();"),
    ];
    let mut d = consumer("D", &[uses("E")]);
    d.members = vec![method(Accessibility::Public, "void", "Foo", "own();")];

    let resolution = resolve(vec![e, d]);
    assert_eq!(resolution.diagnostics.len(), 1);
    let diag = &resolution.diagnostics[0];
    assert_eq!(diag.code, DiagnosticCode::MemberConflict);
    assert_eq!(
        diag.message,
        "class 'D' already contains a member named 'Foo' required by mixin 'E'"
    );

    let aug = resolution.artifact("Sample.D.UseMixins.g.cs").expect("augmentation");
    assert!(!aug.contents.contains("Foo()"));
    assert!(aug.contents.contains("public void Bar()"));
}

#[test]
fn non_partial_consumer_gets_nothing() {
    let mut a = mixin("A");
    a.members = vec![auto_property("int", "X", Some("1"))];
    let mut c = consumer("C", &[uses("A")]);
    c.modifiers.clear();

    let resolution = resolve(vec![a, c]);
    let codes: Vec<DiagnosticCode> = resolution.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::ConsumerNotPartial]);
    assert!(resolution
        .artifacts
        .iter()
        .all(|a| a.kind != ArtifactKind::Augmentation));
    assert!(resolution.artifact("Sample.I_MxA.g.cs").is_some());
}

#[test]
fn invalid_mixins_fail_independently() {
    let mut concrete = mixin("Concrete");
    concrete.modifiers.clear();
    let mut derived = mixin("Derived");
    derived.base = Some(TypeRef::named("Sample.Base"));
    let mut rooted = mixin("Rooted");
    rooted.base = Some(TypeRef::named("object"));
    let host = consumer("Host", &[uses("Concrete"), uses("Rooted"), uses("Plain")]);
    let plain = TypeDeclaration::new("Sample", "Plain");

    let resolution = resolve(vec![concrete, derived, rooted, plain, host]);
    let codes: Vec<&str> = resolution.diagnostics.iter().map(|d| d.code.id()).collect();
    assert_eq!(codes, vec!["MXN001", "MXN002", "MXN004", "MXN004"]);
    assert_eq!(resolution.interfaces.len(), 1);
    assert_eq!(resolution.augmentations.len(), 1);
    assert_eq!(
        resolution.augmentations[0].interfaces,
        vec![TypeRef::named("Sample.I_MxRooted")]
    );
}

#[test]
fn copied_members_keep_their_full_declaration() {
    let mut a = mixin("Counter");
    let mut count = auto_property("int", "Count", Some("2"));
    count.docs = vec!["/// <summary>Current value.</summary>".to_string()];
    let mut bump = method(Accessibility::Public, "int", "Bump", "Count += by;\nreturn Count;");
    bump.params = vec![param("int", "by")];
    bump.attributes = vec!["[Obsolete]".to_string()];
    a.members = vec![count, bump];
    let c = consumer("Tally", &[uses("Counter")]);

    let resolution = resolve(vec![a, c]);
    let aug = resolution.artifact("Sample.Tally.UseMixins.g.cs").expect("augmentation");
    let squashed: String = aug.contents.split_whitespace().collect::<Vec<_>>().join(" ");
    assert!(squashed.contains("/// <summary>Current value.</summary> public int Count { get; set; } = 2;"));
    assert!(squashed.contains("[Obsolete] public int Bump(int by) { Count += by; return Count; }"));
}

#[test]
fn closed_generic_use_substitutes_outside_literals() {
    let mut g = mixin("Holder");
    g.type_params = vec!["T".to_string()];
    g.constraints = vec!["T : class".to_string()];
    let mut value = auto_property("T", "Value", None);
    value.initializer = Some("default!".to_string());
    let mut describe = method(Accessibility::Public, "string", "Describe", "");
    describe.body = Body::Expr("\"T=\" + typeof(T).Name".to_string());
    g.members = vec![value, describe];

    let person = TypeDeclaration::new("Sample", "Person");
    let user = consumer("Directory", &[TypeRef::generic("Sample.Holder", vec!["Sample.Person".to_string()])]);

    let resolution = resolve(vec![g, person, user]);
    assert!(resolution.diagnostics.is_empty());

    let iface = resolution.artifact("Sample.I_MxHolder`1.g.cs").expect("generic interface");
    assert!(iface.contents.contains("public interface I_MxHolder<T>\n    where T : class\n"));
    assert!(iface.contents.contains("    T Value { get; set; }\n"));

    let aug = resolution.artifact("Sample.Directory.UseMixins.g.cs").expect("augmentation");
    assert!(aug.contents.contains("public partial class Directory : Sample.I_MxHolder<Sample.Person>\n"));
    assert!(aug.contents.contains("public Sample.Person Value { get; set; } = default!;"));
    assert!(aug.contents.contains("public string Describe() => \"T=\" + typeof(Sample.Person).Name;"));
}

#[test]
fn open_generic_consumer_keeps_parameter_names() {
    let mut g = mixin("Holder");
    g.type_params = vec!["T".to_string()];
    g.members = vec![auto_property("T", "Value", None)];
    let mut user = consumer("Box", &[TypeRef::open("Sample.Holder", 1)]);
    user.type_params = vec!["T".to_string()];

    let resolution = resolve(vec![g, user]);
    let aug = resolution.artifact("Sample.Box`1.UseMixins.g.cs").expect("augmentation");
    assert!(aug.contents.contains("public partial class Box<T> : Sample.I_MxHolder<T>\n"));
    assert!(aug.contents.contains("public T Value { get; set; }"));
}

#[test]
fn reject_policy_keeps_first_duplicate() {
    let mut a = mixin("A");
    a.members = vec![method(Accessibility::Public, "void", "Reset", "a = 0;")];
    let mut b = mixin("B");
    b.members = vec![method(Accessibility::Public, "void", "Reset", "b = 0;")];
    let host = consumer("Host", &[uses("A"), uses("B")]);
    let types = vec![a, b, host];

    let count = |policy| {
        let options = ResolverOptions {
            cross_mixin_conflicts: policy,
            ..ResolverOptions::default()
        };
        let resolution = Resolver::new(options).resolve(&Snapshot::new(types.clone()));
        let copies = resolution.augmentations[0].members.len();
        let severities: Vec<Severity> = resolution.diagnostics.iter().map(|d| d.severity).collect();
        (copies, severities)
    };

    assert_eq!(count(CrossMixinPolicy::Allow), (2, vec![]));
    assert_eq!(count(CrossMixinPolicy::Warn), (2, vec![Severity::Warning]));
    assert_eq!(count(CrossMixinPolicy::Reject), (1, vec![Severity::Error]));
}

#[test]
fn multiple_mixin_constructors_warn_but_still_synthesize() {
    let mut a = mixin("Setup");
    for name in ["InitA", "InitB"] {
        let mut m = method(Accessibility::Protected, "void", name, "ready = true;");
        m.mixin_constructor = true;
        a.members.push(m);
    }
    let resolution = resolve(vec![a]);
    assert_eq!(resolution.warnings().len(), 1);
    assert!(!resolution.has_errors());
    assert_eq!(resolution.interfaces.len(), 1);
}

#[test]
fn custom_prefix_and_usings() {
    let mut a = mixin("Log");
    a.members = vec![method(Accessibility::Public, "void", "Write", "Console.WriteLine();")];
    let host = consumer("Job", &[uses("Log")]);
    let options = ResolverOptions {
        interface_prefix: "ICap".to_string(),
        usings: vec!["System".to_string(), "System.Linq".to_string()],
        ..ResolverOptions::default()
    };

    let resolution = Resolver::new(options).resolve(&Snapshot::new(vec![a, host]));
    assert!(resolution.artifact("Sample.ICapLog.g.cs").is_some());
    let aug = resolution.artifact("Sample.Job.UseMixins.g.cs").expect("augmentation");
    assert!(aug.contents.starts_with("// <auto-generated/>\nusing System;\nusing System.Linq;\n\n"));
    assert!(aug.contents.contains(": Sample.ICapLog\n"));
}

#[test]
fn one_mixin_written_two_ways_is_applied_once() {
    let mut a = mixin("A");
    a.members = vec![method(Accessibility::Public, "void", "Go", "run();")];
    let mut explicit = uses("A");
    explicit.arity = Some(0);
    let c = consumer("C", &[uses("A"), explicit]);

    let resolution = resolve(vec![a, c]);
    assert!(resolution.diagnostics.is_empty());
    let aug = &resolution.augmentations[0];
    assert_eq!(aug.members.len(), 1);
    assert_eq!(aug.interfaces, vec![TypeRef::named("Sample.I_MxA")]);
    let contents = &resolution.artifact("Sample.C.UseMixins.g.cs").expect("augmentation").contents;
    assert_eq!(contents.matches("public void Go()").count(), 1);
}

#[test]
fn closed_generic_interpolation_is_substituted() {
    let mut pool = mixin("Pool");
    pool.type_params = vec!["T".to_string()];
    pool.members = vec![method(
        Accessibility::Public,
        "string",
        "Describe",
        "return $\"{typeof(T).Name} ({{T}})\";",
    )];
    let c = consumer("C", &[TypeRef::generic("Sample.Pool", vec!["Sample.Person".to_string()])]);

    let resolution = resolve(vec![pool, c]);
    let aug = &resolution.augmentations[0];
    assert_eq!(
        aug.members[0].member.body,
        Body::Block("return $\"{typeof(Sample.Person).Name} ({{T}})\";".to_string())
    );
}
