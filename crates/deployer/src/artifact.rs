//! Loading of precompiled contract artifacts as emitted by `solc --abi --bin`.

use {
    alloy::{
        json_abi::{Function, JsonAbi},
        primitives::Bytes,
    },
    std::path::{Path, PathBuf},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path:?} is not a valid ABI")]
    Abi {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path:?} does not contain hex encoded bytecode")]
    Bytecode {
        path: PathBuf,
        source: const_hex::FromHexError,
    },
    #[error("{path:?} contains no bytecode")]
    EmptyBytecode { path: PathBuf },
    #[error("constructor takes {0} arguments but contracts are deployed without arguments")]
    ConstructorArguments(usize),
    #[error("ABI has no function named {0:?}")]
    MissingFunction(String),
}

/// ABI and creation bytecode of a compiled contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn load(
        abi_path: impl AsRef<Path>,
        bytecode_path: impl AsRef<Path>,
    ) -> Result<Self, ArtifactError> {
        let abi_path = abi_path.as_ref();
        let bytecode_path = bytecode_path.as_ref();

        let abi: JsonAbi =
            serde_json::from_str(&read(abi_path)?).map_err(|source| ArtifactError::Abi {
                path: abi_path.to_owned(),
                source,
            })?;
        if let Some(constructor) = &abi.constructor
            && !constructor.inputs.is_empty()
        {
            return Err(ArtifactError::ConstructorArguments(
                constructor.inputs.len(),
            ));
        }

        let bytecode = parse_bytecode(&read(bytecode_path)?).map_err(|source| {
            ArtifactError::Bytecode {
                path: bytecode_path.to_owned(),
                source,
            }
        })?;
        if bytecode.is_empty() {
            return Err(ArtifactError::EmptyBytecode {
                path: bytecode_path.to_owned(),
            });
        }

        Ok(Self { abi, bytecode })
    }

    /// Looks up a function by name. Overloaded functions resolve to the first
    /// declaration.
    pub fn function(&self, name: &str) -> Result<&Function, ArtifactError> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| ArtifactError::MissingFunction(name.to_string()))
    }
}

fn read(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
        path: path.to_owned(),
        source,
    })
}

/// `solc` writes plain hex, other toolchains prefix it with `0x`. Both usually
/// end with a newline.
pub fn parse_bytecode(text: &str) -> Result<Bytes, const_hex::FromHexError> {
    const_hex::decode(text.trim()).map(Bytes::from)
}
