//! Common module for library exports

pub use crate::error::{SymbolError, SymbolResult};
pub use crate::image::{signature_from_image, ImageDebugInfo};
pub use crate::resolver::{resolve_symbol_address, resolve_symbol_address_with};
pub use crate::search::{resolve_in_symbol_path, resolve_in_symbol_path_with};
pub use crate::types::{Address, BuildSignature, Rva, SymbolQuery};
