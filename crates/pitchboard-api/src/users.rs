//! Login-audit reads over the profile mirror store.

use axum::extract::State;
use chrono::{Datelike, Duration, TimeZone, Utc};
use tracing::warn;

use pitchboard_db::models::{ProfileRow, parse_timestamp};
use pitchboard_types::api::{ActionResponse, UserList, UserStats, UserStatsData};
use pitchboard_types::error::ActionError;
use pitchboard_types::models::Profile;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::pitches::run_store;

pub async fn list_users(State(state): State<AppState>) -> ApiResult<UserList> {
    let db = state.clone();
    ApiResult(
        run_store(move || db.mirror.all())
            .await
            .map(|rows| {
                let data: Vec<Profile> = rows.into_iter().map(profile_from_row).collect();
                ActionResponse::success(UserList {
                    count: data.len(),
                    data,
                })
            }),
    )
}

pub async fn user_stats(State(state): State<AppState>) -> ApiResult<UserStatsData> {
    ApiResult(do_user_stats(&state).await)
}

pub async fn do_user_stats(state: &AppState) -> Result<ActionResponse<UserStatsData>, ActionError> {
    let now = Utc::now();
    let today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|ndt| ndt.and_utc())
        .unwrap_or(now);
    let week_ago = now - Duration::days(7);
    let month_start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    let db = state.clone();
    let (stats, recent) = run_store(move || {
        let stats = UserStats {
            total_users: db.mirror.count_all()?,
            users_today: db.mirror.count_created_since(today)?,
            users_this_week: db.mirror.count_created_since(week_ago)?,
            users_this_month: db.mirror.count_created_since(month_start)?,
        };
        let recent = db.mirror.recent(10)?;
        Ok((stats, recent))
    })
    .await?;

    Ok(ActionResponse::success(UserStatsData {
        stats,
        recent_users: recent.into_iter().map(profile_from_row).collect(),
    }))
}

fn profile_from_row(row: ProfileRow) -> Profile {
    let ts = |raw: &str| {
        parse_timestamp(raw).unwrap_or_else(|| {
            warn!("Corrupt timestamp '{}' in profile mirror", raw);
            chrono::DateTime::default()
        })
    };

    Profile {
        created_at: ts(&row.created_at),
        updated_at: ts(&row.updated_at),
        last_login: ts(&row.last_login),
        external_id: row.external_id,
        name: row.name,
        email: row.email,
        username: row.username,
        image: row.image,
        bio: row.bio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_state;

    #[tokio::test]
    async fn stats_count_recent_sign_ins() {
        let state = test_state();
        for i in 0..3 {
            state
                .mirror
                .record_login(
                    &i.to_string(),
                    &format!("User {i}"),
                    &format!("u{i}@example.com"),
                    &format!("u{i}"),
                    "",
                    "",
                )
                .unwrap();
        }

        let resp = do_user_stats(&state).await.unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.stats.total_users, 3);
        assert_eq!(data.stats.users_today, 3);
        assert_eq!(data.stats.users_this_week, 3);
        assert_eq!(data.recent_users.len(), 3);
    }

    #[tokio::test]
    async fn empty_mirror_reports_zero_counts() {
        let state = test_state();
        let resp = do_user_stats(&state).await.unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.stats.total_users, 0);
        assert!(data.recent_users.is_empty());
    }
}
