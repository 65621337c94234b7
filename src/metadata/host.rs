//! The seam between the trim engine and whatever reads and writes PE files.
//!
//! The engine never touches raw bytes. A [`MetadataHost`] loads a binary into the owned
//! [`Assembly`] graph, writes a trimmed graph back, and resolves type references that point
//! outside the assembly being trimmed.
//!
//! [`MemoryHost`] keeps everything in memory. It backs the test-suite and is useful for tools
//! that already hold metadata graphs produced elsewhere.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    metadata::{
        assembly::Assembly,
        signatures::TypeRef,
        typedef::TypeDef,
    },
    Error, Result,
};

/// Debug symbols accompanying a binary.
///
/// The engine carries symbols from the loaded unit to the written one without inspecting them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSymbols {
    /// Raw symbol file contents
    pub data: Vec<u8>,
}

/// A binary loaded by a [`MetadataHost`]: the assembly graph and its optional debug symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedUnit {
    /// The metadata graph
    pub assembly: Assembly,
    /// Debug symbols found next to the binary
    pub debug_symbols: Option<DebugSymbols>,
}

impl LoadedUnit {
    /// A unit without debug symbols
    #[must_use]
    pub fn new(assembly: Assembly) -> Self {
        LoadedUnit {
            assembly,
            debug_symbols: None,
        }
    }
}

/// Loads, writes and resolves assemblies on behalf of the trim engine.
pub trait MetadataHost {
    /// Load the binary at `path`, together with debug symbols next to it if present.
    ///
    /// # Arguments
    /// * `path` - Path of the input binary.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyLoad`] if the file is missing or does not contain a CLR assembly.
    fn load_unit(&mut self, path: &Path) -> Result<LoadedUnit>;

    /// Serialize `unit` to `path`, writing debug symbols next to it if the unit carries any.
    ///
    /// # Arguments
    /// * `unit` - The trimmed unit.
    /// * `path` - Path of the output binary.
    ///
    /// # Errors
    /// Returns an error if the output cannot be written.
    fn write_unit(&mut self, unit: &LoadedUnit, path: &Path) -> Result<()>;

    /// Resolve a type reference to its definition.
    ///
    /// Returns `None` if the defining assembly is unknown to the host or does not define the
    /// type. The engine treats unresolved types as opaque.
    fn resolve_type(&self, type_ref: &TypeRef) -> Option<TypeDef>;

    /// Simple name of the core library (`mscorlib`, `System.Private.CoreLib`, ...)
    fn core_assembly_name(&self) -> &str;

    /// Find a type in the core library by its simple name, searching nested types too.
    fn find_core_type(&self, name: &str) -> Option<TypeRef>;
}

/// A [`MetadataHost`] backed by in-memory maps.
///
/// Inputs are registered per path with [`MemoryHost::add_unit`]; loading returns a copy and
/// keeps the original, so types of already processed assemblies remain resolvable. Outputs are
/// collected per path and can be inspected with [`MemoryHost::written`]. Reference assemblies
/// that are resolvable but never trimmed are registered with [`MemoryHost::add_reference`].
///
/// # Examples
///
/// ```rust
/// use dottrim::metadata::{Assembly, AssemblyIdentity, AssemblyVersion, LoadedUnit, MemoryHost, MetadataHost};
/// use std::path::Path;
///
/// let mut host = MemoryHost::new();
/// let assembly = Assembly::new(AssemblyIdentity::new("Contoso", AssemblyVersion::new(1, 0, 0, 0)));
/// host.add_unit("in/Contoso.dll", LoadedUnit::new(assembly));
///
/// let unit = host.load_unit(Path::new("in/Contoso.dll"))?;
/// host.write_unit(&unit, Path::new("out/Contoso.dll"))?;
/// assert!(host.written(Path::new("out/Contoso.dll")).is_some());
/// # Ok::<(), dottrim::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct MemoryHost {
    core_assembly: String,
    inputs: HashMap<PathBuf, LoadedUnit>,
    references: HashMap<String, Assembly>,
    outputs: HashMap<PathBuf, LoadedUnit>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    /// An empty host whose core library is `mscorlib`
    #[must_use]
    pub fn new() -> Self {
        Self::with_core_assembly("mscorlib")
    }

    /// An empty host with the given core library name
    pub fn with_core_assembly(name: impl Into<String>) -> Self {
        MemoryHost {
            core_assembly: name.into(),
            inputs: HashMap::new(),
            references: HashMap::new(),
            outputs: HashMap::new(),
        }
    }

    /// Register an input binary at `path`
    pub fn add_unit(&mut self, path: impl Into<PathBuf>, unit: LoadedUnit) {
        self.inputs.insert(path.into(), unit);
    }

    /// Register a reference assembly, resolvable by name but never loaded as input
    pub fn add_reference(&mut self, assembly: Assembly) {
        self.references.insert(assembly.identity.name.clone(), assembly);
    }

    /// The unit written to `path`, if any
    #[must_use]
    pub fn written(&self, path: &Path) -> Option<&LoadedUnit> {
        self.outputs.get(path)
    }

    /// Number of units written so far
    #[must_use]
    pub fn written_count(&self) -> usize {
        self.outputs.len()
    }

    fn assembly_named(&self, name: &str) -> Option<&Assembly> {
        self.references.get(name).or_else(|| {
            self.inputs
                .values()
                .map(|unit| &unit.assembly)
                .find(|assembly| assembly.identity.name == name)
        })
    }
}

impl MetadataHost for MemoryHost {
    fn load_unit(&mut self, path: &Path) -> Result<LoadedUnit> {
        match self.inputs.get(path) {
            Some(unit) => Ok(unit.clone()),
            None => Err(Error::AssemblyLoad {
                assembly: path.display().to_string(),
                message: "is not a PE file containing a CLR module or assembly".to_string(),
            }),
        }
    }

    fn write_unit(&mut self, unit: &LoadedUnit, path: &Path) -> Result<()> {
        self.outputs.insert(path.to_path_buf(), unit.clone());
        Ok(())
    }

    fn resolve_type(&self, type_ref: &TypeRef) -> Option<TypeDef> {
        self.assembly_named(&type_ref.assembly)?
            .module
            .find_type(type_ref)
            .cloned()
    }

    fn core_assembly_name(&self) -> &str {
        &self.core_assembly
    }

    fn find_core_type(&self, name: &str) -> Option<TypeRef> {
        fn search(type_def: &TypeDef, type_ref: TypeRef, name: &str) -> Option<TypeRef> {
            if type_def.name == name {
                return Some(type_ref);
            }

            type_def
                .nested_types
                .iter()
                .find_map(|nested| search(nested, type_ref.nested(nested.name.clone()), name))
        }

        let core = self.assembly_named(&self.core_assembly)?;
        core.module.types.iter().find_map(|type_def| {
            search(
                type_def,
                type_def.type_ref(&core.identity.name, None),
                name,
            )
        })
    }
}
