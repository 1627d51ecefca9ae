// SPDX-FileCopyrightText: 2026 Miga Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per aggregate.

pub mod catalog;
pub mod conversations;
pub mod customers;
pub mod orders;
