// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Provides authentication, the issue listing source and rate limit helpers.

pub mod auth;
pub mod issues;
pub mod ratelimit;
