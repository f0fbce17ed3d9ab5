// src/db/appointments_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ledger_store::{ensure_movable, ensure_transition, not_found, occupied_error, LedgerStore},
    models::appointment::{
        Appointment, AppointmentFilter, AppointmentStatus, CancelOutcome, NewAppointment, Slot,
    },
};

const APPOINTMENT_COLUMNS: &str = r#"
    id, service_id, professional_id, date, time,
    customer_name, customer_phone, status, price, payment_method,
    seq, created_at, updated_at
"#;

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

/// Ledger no Postgres. O índice único parcial `appointments_active_slot_uniq`
/// é a trava definitiva; o SELECT prévio só serve para devolver o motivo certo.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.into()))?;
        Ok(())
    }

    async fn find_occupant<'e, E>(
        executor: E,
        slot: &Slot,
        exclude: Option<Uuid>,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let occupant = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            SELECT {APPOINTMENT_COLUMNS}
            FROM appointments
            WHERE professional_id = $1 AND date = $2 AND time = $3
              AND status <> 'CANCELLED'
              AND ($4::uuid IS NULL OR id <> $4)
            LIMIT 1
            "#
        ))
            .bind(&slot.professional_id)
            .bind(slot.date)
            .bind(&slot.time)
            .bind(exclude)
            .fetch_optional(executor)
            .await?;

        Ok(occupant)
    }

    async fn lock_by_id<'e, E>(executor: E, id: Uuid) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1 FOR UPDATE"
        ))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| not_found(id))
    }

    // Perdemos a corrida para outro escritor: relemos o ocupante fora da transação
    // (que já foi abortada) para dizer se é booking ou bloqueio.
    async fn conflict_after_race(&self, slot: &Slot, exclude: Option<Uuid>) -> AppError {
        match Self::find_occupant(&self.pool, slot, exclude).await {
            Ok(Some(occupant)) => occupied_error(&occupant),
            Ok(None) => AppError::SlotTaken(slot.clone()),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        if let Some(occupant) = Self::find_occupant(&mut *tx, new.slot(), None).await? {
            return Err(occupied_error(&occupant));
        }

        let (customer_name, customer_phone) = match &new.customer {
            Some(c) => (Some(c.name.clone()), Some(c.phone.clone())),
            None => (None, None),
        };

        let inserted = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            INSERT INTO appointments (
                id, service_id, professional_id, date, time,
                customer_name, customer_phone, status, price, payment_method
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
            .bind(Uuid::new_v4())
            .bind(&new.service_id)
            .bind(&new.slot.professional_id)
            .bind(new.slot.date)
            .bind(&new.slot.time)
            .bind(customer_name)
            .bind(customer_phone)
            .bind(new.status)
            .bind(new.price)
            .bind(new.payment_method)
            .fetch_one(&mut *tx)
            .await;

        match inserted {
            Ok(appointment) => {
                tx.commit().await?;
                Ok(appointment)
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                Err(self.conflict_after_race(new.slot(), None).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn relocate(&self, id: Uuid, to: Slot) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_by_id(&mut *tx, id).await?;
        ensure_movable(&current)?;

        if current.slot() == to {
            tx.commit().await?;
            return Ok(current);
        }

        if let Some(occupant) = Self::find_occupant(&mut *tx, &to, Some(id)).await? {
            return Err(occupied_error(&occupant));
        }

        let updated = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments
            SET professional_id = $2, date = $3, time = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(&to.professional_id)
            .bind(to.date)
            .bind(&to.time)
            .fetch_one(&mut *tx)
            .await;

        match updated {
            Ok(appointment) => {
                tx.commit().await?;
                Ok(appointment)
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                Err(self.conflict_after_race(&to, Some(id)).await)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn transition(&self, id: Uuid, next: AppointmentStatus) -> Result<Appointment, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_by_id(&mut *tx, id).await?;
        if current.status == next {
            tx.commit().await?;
            return Ok(current);
        }
        ensure_transition(&current, next)?;

        let updated = sqlx::query_as::<_, Appointment>(&format!(
            r#"
            UPDATE appointments SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {APPOINTMENT_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(next)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn cancel(&self, id: Uuid) -> Result<CancelOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = Self::lock_by_id(&mut *tx, id).await?;

        let outcome = match current.status {
            AppointmentStatus::Cancelled => CancelOutcome::AlreadyCancelled { appointment: current },
            AppointmentStatus::Blocked => {
                sqlx::query("DELETE FROM appointments WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                CancelOutcome::Unblocked { id }
            }
            _ => {
                let appointment = sqlx::query_as::<_, Appointment>(&format!(
                    r#"
                    UPDATE appointments SET status = 'CANCELLED', updated_at = NOW()
                    WHERE id = $1
                    RETURNING {APPOINTMENT_COLUMNS}
                    "#
                ))
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
                CancelOutcome::Cancelled { appointment }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(appointment)
    }

    async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE TRUE"
        ));

        if let Some(professional_id) = &filter.professional_id {
            qb.push(" AND professional_id = ").push_bind(professional_id.clone());
        }
        if let Some(range) = filter.date_range {
            qb.push(" AND date BETWEEN ")
                .push_bind(range.from)
                .push(" AND ")
                .push_bind(range.to);
        }
        if let Some(statuses) = &filter.status_in {
            if statuses.is_empty() {
                qb.push(" AND FALSE");
            } else {
                qb.push(" AND status IN (");
                let mut separated = qb.separated(", ");
                for status in statuses {
                    separated.push_bind(*status);
                }
                separated.push_unseparated(")");
            }
        }
        qb.push(" ORDER BY date ASC, time ASC, seq ASC");

        let appointments = qb
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(appointments)
    }
}
