//! Integration tests for the trim engine.
//!
//! Each test builds a policy and an in-memory assembly, runs the engine over it and inspects
//! the rewritten graph.

use dottrim::{
    metadata::{
        FieldAttributes, ManifestResource, MemberRefSignature, MethodModifiers, SecurityAction,
        SecurityDeclaration, TypeAttributes,
    },
    prelude::*,
};

const A: &str = "A";

fn assembly(name: &str, types: Vec<TypeDef>) -> Assembly {
    let mut assembly = Assembly::new(AssemblyIdentity::new(name, AssemblyVersion::new(1, 0, 0, 0)));
    assembly.module.types.push(TypeDefBuilder::new("<Module>").build());
    assembly.module.types.extend(types);
    assembly.module.refresh_all_types();
    assembly
}

fn class(name: &str) -> TypeSignature {
    let (namespace, name) = name.rsplit_once('.').unwrap_or(("", name));
    TypeSignature::Class(TypeRef::new(A, namespace, name))
}

fn core_library() -> Assembly {
    let attribute = |namespace: &str, name: &str| {
        TypeDefBuilder::new(name)
            .namespace(namespace)
            .public()
            .extends(TypeSignature::Class(TypeRef::new("mscorlib", "System", "Attribute")))
            .build()
    };

    let mut core = Assembly::new(AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)));
    core.module.types = vec![
        TypeDefBuilder::new("IDisposable")
            .namespace("System")
            .public()
            .interface()
            .method(MethodDefBuilder::new("Dispose").public().abstract_method().build())
            .build(),
        attribute("System.Security", "SecurityCriticalAttribute"),
        attribute("System.Security", "SecuritySafeCriticalAttribute"),
        attribute("System.Runtime.CompilerServices", "FriendAccessAllowedAttribute"),
    ];
    core
}

fn host_with(assemblies: &[&Assembly]) -> MemoryHost {
    let mut host = MemoryHost::new();
    host.add_reference(core_library());
    for assembly in assemblies {
        host.add_reference((*assembly).clone());
    }
    host
}

fn trim(policy: &PolicyModel, options: TrimOptions, assembly: &mut Assembly) {
    let host = host_with(&[&*assembly]);
    Trimmer::new(policy, options)
        .rewrite_assembly(&host, assembly)
        .unwrap();
}

fn find<'a>(assembly: &'a Assembly, name: &str) -> &'a TypeDef {
    assembly
        .module
        .types
        .iter()
        .find(|t| t.qualified_name(None) == name)
        .unwrap()
}

fn method<'a>(type_def: &'a TypeDef, name: &str) -> Option<&'a MethodDef> {
    type_def.methods.iter().find(|m| m.name == name)
}

/// Example 1: members and interfaces without policy entries disappear.
#[test]
fn example_pruning() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ApiRoot">
               <Type Name="A.Foo" Status="ApiRoot">
                 <Member MemberType="Method" Name="ToString" Status="ApiRoot"/>
               </Type>
             </Assembly>
             <Assembly Name="B" Status="ImplRoot">
               <Type Name="System.IDisposable" Status="Exclude"/>
             </Assembly>
           </ThinModel>"#,
    )?;

    let mut a = assembly(
        A,
        vec![TypeDefBuilder::new("Foo")
            .namespace("A")
            .public()
            .implements(TypeSignature::Class(TypeRef::new("B", "System", "IDisposable")))
            .method(
                MethodDefBuilder::new("ToString")
                    .public()
                    .virtual_method()
                    .returns(TypeSignature::String)
                    .build(),
            )
            .method(MethodDefBuilder::new("Bar").public().build())
            .build()],
    );
    trim(&policy, TrimOptions::default(), &mut a);

    let foo = find(&a, "A.Foo");
    assert!(method(foo, "ToString").is_some());
    assert!(method(foo, "Bar").is_none());
    assert!(foo.interfaces.is_empty());
    assert_eq!(a.module.all_types, vec!["<Module>", "A.Foo"]);
    Ok(())
}

/// Example 2: narrowing a method that implicitly implements an interface method adds an
/// explicit implementation edge.
#[test]
fn example_narrowing_with_explicit_impl() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ApiRoot">
               <Type Name="A.IM">
                 <Member Name="M"/>
               </Type>
               <Type Name="A.Impl">
                 <Member Name="M" VO="internal"/>
               </Type>
             </Assembly>
           </ThinModel>"#,
    )?;

    let mut a = assembly(
        A,
        vec![
            TypeDefBuilder::new("IM")
                .namespace("A")
                .public()
                .interface()
                .method(
                    MethodDefBuilder::new("M")
                        .public()
                        .abstract_method()
                        .param("value", TypeSignature::I4)
                        .build(),
                )
                .build(),
            TypeDefBuilder::new("Impl")
                .namespace("A")
                .public()
                .implements(class("A.IM"))
                .method(
                    MethodDefBuilder::new("M")
                        .public()
                        .virtual_method()
                        .param("value", TypeSignature::I4)
                        .build(),
                )
                .build(),
        ],
    );
    trim(&policy, TrimOptions::default(), &mut a);

    let implementation = find(&a, "A.Impl");
    let m = method(implementation, "M").unwrap();
    assert_eq!(m.access, MemberAccessFlags::ASSEM);

    assert_eq!(implementation.method_impls.len(), 1);
    let edge = &implementation.method_impls[0];
    assert_eq!(edge.implemented.declaring_type, class("A.IM"));
    assert_eq!(edge.implemented.name, "M");
    assert_eq!(edge.implementing.declaring_type, class("A.Impl"));
    assert_eq!(edge.implementing.name, "M");
    assert_eq!(
        edge.implementing.method_signature().unwrap().params,
        vec![TypeSignature::I4]
    );

    // The interface itself keeps its public member
    let interface = find(&a, "A.IM");
    assert_eq!(method(interface, "M").unwrap().access, MemberAccessFlags::PUBLIC);
    Ok(())
}

/// Example 3: kept classes without constructors get a private one.
#[test]
fn example_constructor_synthesis() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Bare"/>
               <Type Name="A.Helpers"/>
               <Type Name="A.Point"/>
             </Assembly>
           </ThinModel>"#,
    )?;

    let mut a = assembly(
        A,
        vec![
            TypeDefBuilder::new("Bare").namespace("A").build(),
            TypeDefBuilder::new("Helpers").namespace("A").static_class().build(),
            TypeDefBuilder::new("Point").namespace("A").value_type().build(),
        ],
    );
    let options = TrimOptions::default().ensure_constructors_present(true);
    trim(&policy, options, &mut a);

    let bare = find(&a, "A.Bare");
    assert_eq!(bare.methods.len(), 1);
    let ctor = &bare.methods[0];
    assert!(ctor.is_constructor());
    assert_eq!(ctor.access, MemberAccessFlags::PRIVATE);
    assert!(ctor.signature.params.is_empty());
    assert_eq!(ctor.signature.return_type, TypeSignature::Void);
    assert_eq!(ctor.body.as_ref().map(|body| body.code.clone()), Some(vec![0x2A]));

    assert!(find(&a, "A.Helpers").methods.is_empty());
    assert!(find(&a, "A.Point").methods.is_empty());

    // The synthesized constructor has no entry of its own
    let bare_entry = policy.get_assembly(A).unwrap().get_type("A.Bare").unwrap();
    assert_eq!(bare_entry.members().count(), 0);
    Ok(())
}

#[test]
fn constructor_synthesis_is_idempotent() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r##"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Bare">
                 <Member Name="#ctor"/>
               </Type>
             </Assembly>
           </ThinModel>"##,
    )?;
    let options = TrimOptions::default().ensure_constructors_present(true);

    let mut a = assembly(A, vec![TypeDefBuilder::new("Bare").namespace("A").build()]);
    trim(&policy, options, &mut a);
    let once = a.clone();
    trim(&policy, options, &mut a);

    assert_eq!(find(&a, "A.Bare").methods.len(), 1);
    assert_eq!(a, once);
    Ok(())
}

#[test]
fn excluded_members_are_gone_everywhere() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.ICloseable">
                 <Member Name="Close"/>
                 <Member Name="Abort" Status="Exclude"/>
               </Type>
               <Type Name="A.Stream">
                 <Member Name="Close"/>
                 <Member Name="Abort" Status="Exclude"/>
                 <Member MemberType="Field" Name="_handle"/>
                 <Member MemberType="Field" Name="_cache" Status="Exclude"/>
               </Type>
             </Assembly>
           </ThinModel>"#,
    )?;

    let void = MethodSignature::instance(TypeSignature::Void, Vec::new());
    let edge = |implementing: &str, implemented: &str| MethodImpl {
        implementing: MemberRef::method(class("A.Stream"), implementing, void.clone()),
        implemented: MemberRef::method(class("A.ICloseable"), implemented, void.clone()),
    };

    let mut a = assembly(
        A,
        vec![
            TypeDefBuilder::new("ICloseable")
                .namespace("A")
                .interface()
                .method(MethodDefBuilder::new("Close").public().abstract_method().build())
                .method(MethodDefBuilder::new("Abort").public().abstract_method().build())
                .build(),
            TypeDefBuilder::new("Stream")
                .namespace("A")
                .implements(class("A.ICloseable"))
                .field(FieldDef::new("_handle", TypeSignature::I))
                .field(FieldDef::new("_cache", TypeSignature::Object))
                .method(MethodDefBuilder::new("Close").virtual_method().build())
                .method(MethodDefBuilder::new("Abort").virtual_method().build())
                .method_impl(edge("Close", "Close"))
                .method_impl(edge("Abort", "Abort"))
                .method_impl(edge("Close", "Abort"))
                .method_impl(edge("Abort", "Close"))
                .build(),
        ],
    );
    trim(&policy, TrimOptions::default(), &mut a);

    let stream = find(&a, "A.Stream");
    assert!(method(stream, "Abort").is_none());
    assert!(stream.fields.iter().all(|field| field.name != "_cache"));
    assert!(method(find(&a, "A.ICloseable"), "Abort").is_none());

    assert_eq!(stream.method_impls, vec![edge("Close", "Close")]);
    for method_impl in &stream.method_impls {
        assert_ne!(method_impl.implementing.name, "Abort");
        assert_ne!(method_impl.implemented.name, "Abort");
    }
    Ok(())
}

#[test]
fn interface_edges_stay_closed() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.IKept"/>
               <Type Name="A.Outer"/>
               <Type Name="A.Outer+Inner"/>
             </Assembly>
             <Assembly Name="B" Status="ImplRoot"/>
           </ThinModel>"#,
    )?;

    let interfaces = vec![
        class("A.IKept"),
        class("A.IGone"),
        TypeSignature::Class(TypeRef::new("B", "B", "IRemote")),
        TypeSignature::Class(TypeRef::new("mscorlib", "System", "IDisposable")),
        TypeSignature::GenericInst(
            Box::new(TypeSignature::Class(TypeRef::new("mscorlib", "System", "IEquatable`1"))),
            vec![class("A.Outer")],
        ),
    ];

    let mut inner = TypeDefBuilder::new("Inner").nested_public();
    let mut outer = TypeDefBuilder::new("Outer").namespace("A").public();
    for interface in &interfaces {
        inner = inner.implements(interface.clone());
        outer = outer.implements(interface.clone());
    }

    let mut a = assembly(
        A,
        vec![
            TypeDefBuilder::new("IKept").namespace("A").interface().build(),
            TypeDefBuilder::new("IGone").namespace("A").interface().build(),
            outer.nested(inner.build()).build(),
        ],
    );
    trim(&policy, TrimOptions::default(), &mut a);

    let entry = policy.get_assembly(A).unwrap();
    let outer = find(&a, "A.Outer");
    for type_def in [outer, &outer.nested_types[0]] {
        assert_eq!(type_def.interfaces.len(), 3);
        for interface in &type_def.interfaces {
            let type_ref = interface.type_ref().unwrap();
            assert!(
                entry.get_type(&type_ref.full_name()).is_some()
                    || !policy.contains_assembly(&type_ref.assembly)
            );
        }
    }
    assert_eq!(
        a.module.all_types,
        vec!["<Module>", "A.IKept", "A.Outer", "A.Outer+Inner"]
    );
    Ok(())
}

#[test]
fn visibility_never_widens() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Surface" Status="ApiFxInternal">
                 <Member MemberType="Field" Name="f0" VO="internal"/>
                 <Member MemberType="Field" Name="f1" VO="internal"/>
                 <Member MemberType="Field" Name="f2" Status="ApiFxInternal"/>
                 <Member MemberType="Field" Name="f3" Status="ApiFxInternal"/>
                 <Member MemberType="Field" Name="f4" VO="internal"/>
                 <Member MemberType="Field" Name="f5" Status="ApiRoot"/>
                 <Member MemberType="Field" Name="f6" VO="internal"/>
               </Type>
               <Type Name="A.Surface+Nested" VO="internal"/>
             </Assembly>
           </ThinModel>"#,
    )?;

    let accesses = [
        MemberAccessFlags::COMPILER_CONTROLLED,
        MemberAccessFlags::PRIVATE,
        MemberAccessFlags::FAM_AND_ASSEM,
        MemberAccessFlags::ASSEM,
        MemberAccessFlags::FAMILY,
        MemberAccessFlags::FAM_OR_ASSEM,
        MemberAccessFlags::PUBLIC,
    ];
    let mut surface = TypeDefBuilder::new("Surface")
        .namespace("A")
        .public()
        .nested(TypeDefBuilder::new("Nested").nested_public().build());
    for (i, access) in accesses.iter().enumerate() {
        let mut field = FieldDef::new(format!("f{}", i), TypeSignature::I4);
        field.access = *access;
        surface = surface.field(field);
    }

    let original = assembly(A, vec![surface.build()]);
    let mut a = original.clone();
    trim(&policy, TrimOptions::default(), &mut a);

    let before = find(&original, "A.Surface");
    let after = find(&a, "A.Surface");
    for (old, new) in before.fields.iter().zip(&after.fields) {
        assert!(new.access.rank() <= old.access.rank(), "{} widened", old.name);
    }

    assert_eq!(after.fields[4].access, MemberAccessFlags::FAM_AND_ASSEM);
    assert_eq!(after.fields[5].access, MemberAccessFlags::FAM_OR_ASSEM);
    assert_eq!(after.fields[6].access, MemberAccessFlags::ASSEM);
    assert_eq!(after.flags & TypeAttributes::VISIBILITY_MASK, TypeAttributes::NOT_PUBLIC);
    assert_eq!(
        after.nested_types[0].flags & TypeAttributes::VISIBILITY_MASK,
        TypeAttributes::NESTED_ASSEMBLY
    );
    Ok(())
}

#[test]
fn runs_are_deterministic() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Zeta"><Member Name="Run" VO="internal"/></Type>
               <Type Name="A.Alpha"><Member MemberType="Field" Name="_x"/></Type>
               <Type Name="A.IRun"><Member Name="Run"/></Type>
             </Assembly>
           </ThinModel>"#,
    )?;

    let input = assembly(
        A,
        vec![
            TypeDefBuilder::new("Zeta")
                .namespace("A")
                .public()
                .implements(class("A.IRun"))
                .implements(TypeSignature::Class(TypeRef::new("mscorlib", "System", "IDisposable")))
                .method(MethodDefBuilder::new("Run").public().virtual_method().build())
                .method(MethodDefBuilder::new("Dispose").public().virtual_method().build())
                .build(),
            TypeDefBuilder::new("Alpha")
                .namespace("A")
                .field(FieldDef::new("_x", TypeSignature::I4))
                .field(FieldDef::new("_y", TypeSignature::I4))
                .build(),
            TypeDefBuilder::new("IRun")
                .namespace("A")
                .interface()
                .method(MethodDefBuilder::new("Run").public().abstract_method().build())
                .build(),
            TypeDefBuilder::new("Dropped").namespace("A").build(),
        ],
    );

    let options = TrimOptions::default()
        .ensure_constructors_present(true)
        .apply_annotations(true);
    let mut first = input.clone();
    let mut second = input.clone();
    trim(&policy, options, &mut first);
    trim(&policy, options, &mut second);

    assert_eq!(first, second);
    assert_eq!(first.module.all_types, vec!["<Module>", "A.Zeta", "A.Alpha", "A.IRun"]);
    Ok(())
}

#[test]
fn type_forwarders() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <TypeForwarder AssemblyName="B" TypeName="B.Kept" Status="ApiRoot"/>
               <TypeForwarder AssemblyName="B" TypeName="B.Excluded" Status="Exclude"/>
             </Assembly>
           </ThinModel>"#,
    )?;

    let mut kept = ExportedType::forwarder("B", "Kept", "B");
    kept.nested.push(ExportedType::forwarder("", "Nested", "B"));

    let mut a = assembly(A, Vec::new());
    a.module.exported_types = vec![
        kept,
        ExportedType::forwarder("B", "Excluded", "B"),
        ExportedType::forwarder("B", "Unlisted", "B"),
        ExportedType::forwarder("B", "Kept", "C"),
    ];
    trim(&policy, TrimOptions::default(), &mut a);

    assert_eq!(a.module.exported_types.len(), 1);
    assert_eq!(a.module.exported_types[0].full_name(), "B.Kept");
    assert_eq!(a.module.exported_types[0].nested[0].name, "Nested");
    Ok(())
}

#[test]
fn security_annotations_and_friend_access() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Gate" Status="ApiFxInternal" SecurityTransparencyStatus="Critical">
                 <Member Name="Open" Status="ImplRoot" SecurityTransparencyStatus="SafeCritical"/>
                 <Member Name="Close" Status="ImplRoot" SecurityTransparencyStatus="Transparent"/>
                 <Member MemberType="Property" Name="IsOpen" Status="ApiFxInternal"/>
               </Type>
             </Assembly>
           </ThinModel>"#,
    )?;

    let critical = CustomAttribute::new(TypeRef::new("mscorlib", "System.Security", "SecurityCriticalAttribute"));
    let mut a = assembly(
        A,
        vec![TypeDefBuilder::new("Gate")
            .namespace("A")
            .public()
            .method(MethodDefBuilder::new("Open").public().build())
            .method(
                MethodDefBuilder::new("Close")
                    .public()
                    .attribute(critical.clone())
                    .build(),
            )
            .property(PropertyDef::new("IsOpen", TypeSignature::Boolean))
            .build()],
    );
    trim(&policy, TrimOptions::default().apply_annotations(true), &mut a);

    let gate = find(&a, "A.Gate");
    let names = |attributes: &[CustomAttribute]| -> Vec<String> {
        attributes.iter().map(|a| a.attribute_type.full_name()).collect()
    };

    assert_eq!(
        names(&gate.custom_attributes),
        vec![
            "System.Security.SecurityCriticalAttribute",
            "System.Runtime.CompilerServices.FriendAccessAllowedAttribute",
        ]
    );
    assert_eq!(
        names(&method(gate, "Open").unwrap().custom_attributes),
        vec!["System.Security.SecuritySafeCriticalAttribute"]
    );
    assert!(method(gate, "Close").unwrap().custom_attributes.is_empty());
    assert!(gate.properties[0].custom_attributes.is_empty());
    assert_eq!(gate.flags & TypeAttributes::VISIBILITY_MASK, TypeAttributes::NOT_PUBLIC);
    Ok(())
}

#[test]
fn desktop_security_and_serializability() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Legacy">
                 <Member Name="Call"/>
                 <Member MemberType="Field" Name="_cache"/>
               </Type>
             </Assembly>
           </ThinModel>"#,
    )?;

    let attribute = |namespace: &str, name: &str| {
        CustomAttribute::new(TypeRef::new("mscorlib", namespace, name))
    };
    let mut cache = FieldDef::new("_cache", TypeSignature::Object);
    cache.flags = FieldAttributes::NOT_SERIALIZED;
    cache.custom_attributes.push(attribute("System", "NonSerializedAttribute"));

    let mut a = assembly(
        A,
        vec![TypeDefBuilder::new("Legacy")
            .namespace("A")
            .serializable()
            .security(SecurityDeclaration::new(SecurityAction::InheritanceDemand, Vec::new()))
            .attribute(attribute("System.Security", "SuppressUnmanagedCodeSecurityAttribute"))
            .field(cache)
            .method(
                MethodDefBuilder::new("Call")
                    .security(SecurityDeclaration::new(SecurityAction::LinkDemand, Vec::new()))
                    .security(SecurityDeclaration::new(SecurityAction::Demand, Vec::new()))
                    .build(),
            )
            .build()],
    );
    a.security.push(SecurityDeclaration::new(SecurityAction::LinkDemand, Vec::new()));
    a.module.resources.push(ManifestResource {
        name: "A.Strings.resources".to_string(),
        public: true,
        data: vec![0xCE, 0xCA, 0xEF, 0xBE],
    });

    let options = TrimOptions::default()
        .remove_desktop_security(true)
        .remove_serializability_info(true)
        .remove_manifest_resources(true);
    trim(&policy, options, &mut a);

    let legacy = find(&a, "A.Legacy");
    assert!(!legacy.is_serializable());
    assert!(legacy.security.is_empty());
    assert_eq!(legacy.flags & TypeAttributes::HAS_SECURITY, 0);
    assert!(legacy.custom_attributes.is_empty());

    let cache = &legacy.fields[0];
    assert!(!cache.is_not_serialized());
    assert!(cache.custom_attributes.is_empty());

    let call = method(legacy, "Call").unwrap();
    assert_eq!(call.security.len(), 1);
    assert!(call.modifiers.contains(MethodModifiers::HAS_SECURITY));

    assert!(a.security.is_empty());
    assert!(a.module.resources.is_empty());
    Ok(())
}

#[test]
fn unsupported_member_reference() -> Result<()> {
    let policy = PolicyModel::from_xml(
        r#"<ThinModel>
             <Assembly Name="A" Status="ImplRoot">
               <Type Name="A.Odd"/>
             </Assembly>
           </ThinModel>"#,
    )?;

    let void = MethodSignature::instance(TypeSignature::Void, Vec::new());
    let mut a = assembly(
        A,
        vec![TypeDefBuilder::new("Odd")
            .namespace("A")
            .method_impl(MethodImpl {
                implementing: MemberRef {
                    declaring_type: class("A.Odd"),
                    name: "Weird".to_string(),
                    signature: MemberRefSignature::Other(0x07),
                },
                implemented: MemberRef::method(class("A.IOdd"), "Weird", void),
            })
            .build()],
    );

    let host = host_with(&[]);
    let result = Trimmer::new(&policy, TrimOptions::default()).rewrite_assembly(&host, &mut a);
    assert!(matches!(result, Err(Error::UnsupportedMemberKind(_))));
    Ok(())
}
