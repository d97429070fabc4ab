// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod command;
pub mod errors;
pub mod forms;
pub mod ids;
pub mod input;
pub mod model;
pub mod notice;
pub mod results;
pub mod state;

pub use command::*;
pub use errors::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use notice::*;
pub use results::*;
pub use state::*;
