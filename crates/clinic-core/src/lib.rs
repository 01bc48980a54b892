//! # Clinic Core
//!
//! 诊所系统的核心模块，提供业务记录模型、日期归一化、错误定义和通用工具。

pub mod date;
pub mod error;
pub mod models;
pub mod utils;

pub use date::DateLike;
pub use error::{ClinicError, Result};
pub use models::*;
