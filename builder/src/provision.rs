/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use common::error::{CiError, CiResult};
use common::input::build_plan_id;
use common::types::*;
use connector::{ContinuousIntegrationService, PlanKey, PlanSource, RepositoryKind};
use tracing::{info, instrument};

use crate::renderer::{RepositoryReference, TemplateKey, TemplateRenderer};

pub const TEMPLATE_PLAN_SUFFIX: &str = "BASE";
pub const SOLUTION_PLAN_SUFFIX: &str = "SOLUTION";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExercisePlans {
    pub template: PlanKey,
    pub solution: PlanKey,
}

pub fn plan_key(exercise: &MExercise, suffix: &str) -> PlanKey {
    PlanKey::new(
        exercise.project_key.clone(),
        build_plan_id(&exercise.project_key, &suffix.to_uppercase()),
    )
}

pub fn participation_plan_key(
    exercise: &MExercise,
    participation: &MParticipation,
) -> CiResult<PlanKey> {
    let plan = participation.build_plan_id.clone().ok_or_else(|| {
        CiError::InvalidConfiguration(format!(
            "participation {} has no build plan",
            participation.id
        ))
    })?;

    Ok(PlanKey::new(exercise.project_key.clone(), plan))
}

/// Creates the exercise folder with its template and solution plans.
#[instrument(skip_all, fields(project = %exercise.project_key))]
pub async fn create_exercise_plans(
    ci: &dyn ContinuousIntegrationService,
    renderer: &TemplateRenderer,
    exercise: &MExercise,
    template_repository_url: &str,
    solution_repository_url: &str,
) -> CiResult<ExercisePlans> {
    let credentials_key = renderer.config().credentials_key.as_str();
    let key = TemplateKey::new(
        exercise.programming_language,
        exercise.static_analysis_enabled,
        exercise.sequential_test_runs,
    );
    let tests = RepositoryReference::test(exercise.test_repository_url.clone(), credentials_key);

    let template_document = renderer.render_plan(
        key,
        &tests,
        &RepositoryReference::assignment(template_repository_url, credentials_key),
    )?;
    let solution_document = renderer.render_plan(
        key,
        &tests,
        &RepositoryReference::solution(solution_repository_url, credentials_key),
    )?;

    let plans = ExercisePlans {
        template: plan_key(exercise, TEMPLATE_PLAN_SUFFIX),
        solution: plan_key(exercise, SOLUTION_PLAN_SUFFIX),
    };

    ci.create_project(&exercise.project_key).await?;
    ci.create_or_copy_plan(PlanSource::Document(template_document), &plans.template)
        .await?;
    ci.create_or_copy_plan(PlanSource::Document(solution_document), &plans.solution)
        .await?;
    ci.enable_plan(&plans.template).await?;
    ci.enable_plan(&plans.solution).await?;

    info!(template = %plans.template, solution = %plans.solution, "Created exercise build plans");
    Ok(plans)
}

/// Gives a participation its own plan, copied from the template plan and
/// pointed at the participation's repository.
#[instrument(skip_all, fields(project = %exercise.project_key, participation = %participation.id))]
pub async fn copy_plan_for_participation(
    ci: &dyn ContinuousIntegrationService,
    exercise: &MExercise,
    participation: &MParticipation,
    plan_suffix: &str,
    template_repository_url: &str,
) -> CiResult<PlanKey> {
    let source = plan_key(exercise, TEMPLATE_PLAN_SUFFIX);
    let target = plan_key(exercise, plan_suffix);
    target.validate()?;

    ci.create_or_copy_plan(PlanSource::Copy(source), &target)
        .await?;
    ci.update_plan_repository(
        &target,
        RepositoryKind::Assignment,
        &participation.repository_url,
        template_repository_url,
    )
    .await?;
    ci.enable_plan(&target).await?;

    info!(plan = %target, "Created participation build plan");
    Ok(target)
}

pub async fn update_participation_repository(
    ci: &dyn ContinuousIntegrationService,
    exercise: &MExercise,
    participation: &MParticipation,
    kind: RepositoryKind,
    new_url: &str,
    previous_url: &str,
) -> CiResult<()> {
    let plan = participation_plan_key(exercise, participation)?;
    ci.update_plan_repository(&plan, kind, new_url, previous_url)
        .await
}

pub async fn trigger_participation_build(
    ci: &dyn ContinuousIntegrationService,
    exercise: &MExercise,
    participation: &MParticipation,
) -> CiResult<()> {
    let plan = participation_plan_key(exercise, participation)?;
    ci.trigger_build(&plan).await
}

pub async fn delete_exercise_plans(
    ci: &dyn ContinuousIntegrationService,
    exercise: &MExercise,
) -> CiResult<()> {
    ci.delete_project(&exercise.project_key).await
}
