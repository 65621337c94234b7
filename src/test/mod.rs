//! Fixtures shared by the unit tests.

use crate::metadata::{
    Assembly, AssemblyIdentity, AssemblyVersion, CustomAttribute, MethodDefBuilder, TypeDefBuilder,
    TypeRef, TypeSignature,
};

/// Name of the core library the fixtures are built against
pub const CORE_LIBRARY: &str = "mscorlib";

/// An attribute whose class lives in the core library
pub fn core_attribute(namespace: &str, name: &str) -> CustomAttribute {
    CustomAttribute::new(TypeRef::new(CORE_LIBRARY, namespace, name))
}

/// A minimal `mscorlib`: the root types, `IDisposable`, the transparency attributes and
/// `FriendAccessAllowedAttribute`.
pub fn core_library() -> Assembly {
    let mut core = Assembly::new(AssemblyIdentity::new(
        CORE_LIBRARY,
        AssemblyVersion::new(4, 0, 0, 0),
    ));
    let attribute_base = TypeSignature::Class(TypeRef::new(CORE_LIBRARY, "System", "Attribute"));

    let types = &mut core.module.types;
    types.push(TypeDefBuilder::new("<Module>").build());
    types.push(
        TypeDefBuilder::new("Object")
            .namespace("System")
            .public()
            .method(MethodDefBuilder::constructor().public().build())
            .build(),
    );
    types.push(
        TypeDefBuilder::new("ValueType")
            .namespace("System")
            .public()
            .build(),
    );
    types.push(
        TypeDefBuilder::new("Attribute")
            .namespace("System")
            .public()
            .build(),
    );
    types.push(
        TypeDefBuilder::new("IDisposable")
            .namespace("System")
            .public()
            .interface()
            .method(MethodDefBuilder::new("Dispose").public().abstract_method().build())
            .build(),
    );

    for (namespace, name) in [
        ("System.Security", "SecurityCriticalAttribute"),
        ("System.Security", "SecuritySafeCriticalAttribute"),
        ("System.Security", "SecurityTreatAsSafeAttribute"),
        ("System.Runtime.CompilerServices", "FriendAccessAllowedAttribute"),
    ] {
        types.push(
            TypeDefBuilder::new(name)
                .namespace(namespace)
                .public()
                .extends(attribute_base.clone())
                .method(MethodDefBuilder::constructor().public().build())
                .build(),
        );
    }

    core.module.refresh_all_types();
    core
}
