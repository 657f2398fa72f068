/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod build_logs;
pub mod correlator;
pub mod feedback;
pub mod locks;
pub mod notification;
pub mod service;
pub mod store;

pub use notification::{NormalizedBuildResult, TestOutcome, TestStatus};
pub use service::{IngestOutcome, IngestService};
pub use store::{DatabaseStore, ResultRecord, ResultStore};
