/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod build_log_entry;
pub mod exercise;
pub mod feedback;
pub mod participation;
pub mod result;
pub mod submission;
