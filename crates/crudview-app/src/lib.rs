// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Headless CRUD view: a list, a detail card and an add/edit form derived from
//! the schema of one record collection, driven as a navigation stack.

pub mod config;
pub mod confirm;
pub mod debounce;
pub mod forms;
pub mod generate;
pub mod memory;
pub mod model;
pub mod nav;
pub mod schema;
pub mod state;
pub mod surfaces;
pub mod template;

pub use config::*;
pub use confirm::*;
pub use debounce::*;
pub use forms::*;
pub use generate::*;
pub use memory::*;
pub use model::*;
pub use nav::*;
pub use schema::*;
pub use state::*;
pub use surfaces::*;
pub use template::*;
