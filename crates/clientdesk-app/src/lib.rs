// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod audit;
pub mod backend;
pub mod codec;
pub mod console;
pub mod edit;
pub mod feed;
pub mod filter;
pub mod forms;
pub mod ids;
pub mod model;
pub mod selection;
pub mod store;

pub use audit::*;
pub use backend::*;
pub use codec::*;
pub use console::*;
pub use edit::*;
pub use feed::*;
pub use filter::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use selection::*;
pub use store::*;
