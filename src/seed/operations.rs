use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schema::{groups, sales, user_groups, users};
use crate::seed::db_types::{CreateGroup, CreateMembership, CreateSale, CreateUser, SeedSummary};

const RNG_SEED: u64 = 0x5a1e5;
const SALES_PER_USER: usize = 40;
const SALES_WINDOW_DAYS: i64 = 365;
const MIN_SALE: i64 = 500;
const MAX_SALE: i64 = 50_000;

const SEED_USERS: [(&str, &str); 6] = [
    ("Alice Martin", "manager"),
    ("Bruno Silva", "sales_rep"),
    ("Chloe Dubois", "sales_rep"),
    ("Daniel Kim", "associate"),
    ("Erin Walsh", "sales_rep"),
    ("Farid Haddad", "associate"),
];

const SEED_GROUPS: [&str; 3] = ["North", "South", "Enterprise"];

// (user index, group index); Alice and Erin sit in two groups each
const SEED_MEMBERSHIPS: [(usize, usize); 8] = [
    (0, 0),
    (0, 2),
    (1, 0),
    (2, 1),
    (3, 1),
    (4, 1),
    (4, 2),
    (5, 0),
];

/// Sales spread uniformly over the `SALES_WINDOW_DAYS` days before `now`
pub fn generate_sales<R: Rng>(rng: &mut R, user_ids: &[i32], now: DateTime<Utc>, per_user: usize) -> Vec<CreateSale> {
    let window_secs = SALES_WINDOW_DAYS * 24 * 60 * 60;

    user_ids
        .iter()
        .flat_map(|user_id| std::iter::repeat(*user_id).take(per_user))
        .map(|user_id| CreateSale {
            user_id,
            amount: rng.gen_range(MIN_SALE..=MAX_SALE),
            sold_at: now - Duration::seconds(rng.gen_range(0..window_secs)),
        })
        .collect()
}

/// Populates an empty database with sample users, groups, memberships and
/// sales in one transaction. Does nothing if any user already exists.
pub fn seed_database(conn: &mut PooledConnection<ConnectionManager<PgConnection>>) -> Result<SeedSummary> {
    let existing = users::table.count().get_result::<i64>(conn)?;
    if existing > 0 {
        tracing::info!(existing, "database already has users, skipping seed");
        return Ok(SeedSummary::default());
    }

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let mut user_ids = Vec::with_capacity(SEED_USERS.len());
        for (name, role) in SEED_USERS {
            let id = diesel::insert_into(users::table)
                .values(&CreateUser {
                    name: name.to_string(),
                    role: role.to_string(),
                })
                .returning(users::id)
                .get_result::<i32>(conn)?;
            user_ids.push(id);
        }

        let mut group_ids = Vec::with_capacity(SEED_GROUPS.len());
        for name in SEED_GROUPS {
            let id = diesel::insert_into(groups::table)
                .values(&CreateGroup { name: name.to_string() })
                .returning(groups::id)
                .get_result::<i32>(conn)?;
            group_ids.push(id);
        }

        let memberships: Vec<CreateMembership> = SEED_MEMBERSHIPS
            .iter()
            .map(|(user, group)| CreateMembership {
                user_id: user_ids[*user],
                group_id: group_ids[*group],
            })
            .collect();
        diesel::insert_into(user_groups::table)
            .values(&memberships)
            .execute(conn)?;

        let mut rng = StdRng::seed_from_u64(RNG_SEED);
        let new_sales = generate_sales(&mut rng, &user_ids, Utc::now(), SALES_PER_USER);
        diesel::insert_into(sales::table).values(&new_sales).execute(conn)?;

        let summary = SeedSummary {
            users: user_ids.len(),
            groups: group_ids.len(),
            memberships: memberships.len(),
            sales: new_sales.len(),
        };
        tracing::info!(?summary, "seeded database");

        Ok(summary)
    })
}
