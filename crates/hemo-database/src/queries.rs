//! 数据库查询操作

use crate::connection::DatabasePool;
use crate::models::*;
use hemo_core::{Acquisition, Clinician, HemoError, Patient, Result};

/// 用户名已被占用时的提示
pub const USERNAME_TAKEN: &str = "Username già in uso";

/// 数据库查询操作接口
///
/// 每个方法只做一次数据库往返（级联删除除外，它在一个事务内完成）。
pub struct DatabaseQueries<'a> {
    pool: &'a DatabasePool,
}

impl<'a> DatabaseQueries<'a> {
    pub fn new(pool: &'a DatabasePool) -> Self {
        Self { pool }
    }

    /// 创建数据库表
    pub async fn create_tables(&self) -> Result<()> {
        let pool = self.pool.pool();

        // 创建医生表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS medici (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username VARCHAR(50) UNIQUE NOT NULL,
                password VARCHAR(100) NOT NULL
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 创建患者表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pazienti (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                nome VARCHAR(50) NOT NULL,
                cognome VARCHAR(50) NOT NULL,
                data_nascita VARCHAR(20) NOT NULL,
                codice_fiscale VARCHAR(16) UNIQUE NOT NULL,
                patologia VARCHAR(100) NOT NULL,
                sesso VARCHAR(10) NOT NULL,
                id_medico INTEGER REFERENCES medici(id)
            )
        "#,
        )
        .execute(pool)
        .await?;

        // 创建采集表
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS acquisizioni (
                acquisizione_id INTEGER PRIMARY KEY AUTOINCREMENT,
                id_paziente INTEGER NOT NULL REFERENCES pazienti(id),
                hb_value VARCHAR(50) NOT NULL,
                acquisition_date VARCHAR(20) NOT NULL,
                acquisition_uri VARCHAR(255) NOT NULL,
                acquisition_type VARCHAR(50) NOT NULL
            )
        "#,
        )
        .execute(pool)
        .await?;

        self.create_indexes().await?;

        tracing::info!("Database tables created successfully");
        Ok(())
    }

    /// 创建数据库索引
    async fn create_indexes(&self) -> Result<()> {
        let pool = self.pool.pool();

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_pazienti_nome ON pazienti(nome)",
            "CREATE INDEX IF NOT EXISTS idx_pazienti_cognome ON pazienti(cognome)",
            "CREATE INDEX IF NOT EXISTS idx_pazienti_id_medico ON pazienti(id_medico)",
            "CREATE INDEX IF NOT EXISTS idx_acquisizioni_id_paziente ON acquisizioni(id_paziente)",
        ];

        for index_sql in indexes {
            sqlx::query(index_sql).execute(pool).await?;
        }

        tracing::debug!("Database indexes created successfully");
        Ok(())
    }

    /// 连通性检查
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool.pool()).await?;
        Ok(())
    }

    // ========== 患者相关操作 ==========

    /// 创建新患者，返回写入后的完整记录
    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient> {
        let row = sqlx::query_as::<_, DbPatient>(
            r#"
            INSERT INTO pazienti (nome, cognome, data_nascita, codice_fiscale, patologia, sesso, id_medico)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
        "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.birth_date)
        .bind(&patient.fiscal_code)
        .bind(&patient.pathology)
        .bind(&patient.sex)
        .bind(patient.clinician_id)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(Patient::from(row))
    }

    /// 根据ID查找患者
    pub async fn get_patient_by_id(&self, id: i64) -> Result<Option<Patient>> {
        let result = sqlx::query_as::<_, DbPatient>("SELECT * FROM pazienti WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(result.map(Patient::from))
    }

    /// 获取所有患者
    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        let results = sqlx::query_as::<_, DbPatient>("SELECT * FROM pazienti ORDER BY id")
            .fetch_all(self.pool.pool())
            .await?;

        Ok(map_rows(results))
    }

    /// 获取某位医生名下的患者
    pub async fn list_patients_by_clinician(&self, clinician_id: i64) -> Result<Vec<Patient>> {
        let results = sqlx::query_as::<_, DbPatient>(
            "SELECT * FROM pazienti WHERE id_medico = ? ORDER BY id",
        )
        .bind(clinician_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(map_rows(results))
    }

    /// 整体覆盖患者的六个数据字段，所属医生保持不变
    ///
    /// 返回是否有行被更新。
    pub async fn update_patient(&self, id: i64, patient: &NewPatient) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE pazienti
            SET nome = ?, cognome = ?, data_nascita = ?, codice_fiscale = ?, patologia = ?, sesso = ?
            WHERE id = ?
        "#,
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.birth_date)
        .bind(&patient.fiscal_code)
        .bind(&patient.pathology)
        .bind(&patient.sex)
        .bind(id)
        .execute(self.pool.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 在同一事务内删除患者及其全部采集记录
    ///
    /// 返回被删除的采集记录数；患者不存在时回滚并返回 `None`。
    pub async fn delete_patient_cascade(&self, id: i64) -> Result<Option<u64>> {
        let mut tx = self.pool.pool().begin().await?;

        let removed = sqlx::query("DELETE FROM acquisizioni WHERE id_paziente = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let deleted = sqlx::query("DELETE FROM pazienti WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(removed))
    }

    // ========== 采集相关操作 ==========

    /// 创建新采集记录
    pub async fn create_acquisition(&self, acquisition: &NewAcquisition) -> Result<Acquisition> {
        let row = sqlx::query_as::<_, DbAcquisition>(
            r#"
            INSERT INTO acquisizioni (id_paziente, hb_value, acquisition_date, acquisition_uri, acquisition_type)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
        "#,
        )
        .bind(acquisition.patient_id)
        .bind(&acquisition.hb_value)
        .bind(&acquisition.acquisition_date)
        .bind(&acquisition.acquisition_uri)
        .bind(&acquisition.acquisition_type)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(Acquisition::from(row))
    }

    /// 根据患者ID获取所有采集记录
    pub async fn list_acquisitions_by_patient(&self, patient_id: i64) -> Result<Vec<Acquisition>> {
        let results = sqlx::query_as::<_, DbAcquisition>(
            "SELECT * FROM acquisizioni WHERE id_paziente = ? ORDER BY acquisizione_id",
        )
        .bind(patient_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(map_rows(results))
    }

    /// 统计患者的采集记录数
    pub async fn count_acquisitions_by_patient(&self, patient_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM acquisizioni WHERE id_paziente = ?",
        )
        .bind(patient_id)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(count)
    }

    /// 删除患者的全部采集记录，返回删除数量
    pub async fn delete_acquisitions_by_patient(&self, patient_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM acquisizioni WHERE id_paziente = ?")
            .bind(patient_id)
            .execute(self.pool.pool())
            .await?;

        Ok(result.rows_affected())
    }

    // ========== 医生相关操作 ==========

    /// 创建新医生账户
    ///
    /// 用户名唯一约束冲突映射为 `HemoError::Conflict`，并发注册同名账户时只有一个成功。
    pub async fn create_clinician(&self, clinician: &NewClinician) -> Result<Clinician> {
        let row = sqlx::query_as::<_, DbClinician>(
            "INSERT INTO medici (username, password) VALUES (?, ?) RETURNING *",
        )
        .bind(&clinician.username)
        .bind(&clinician.password_digest)
        .fetch_one(self.pool.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                HemoError::Conflict(USERNAME_TAKEN.to_string())
            }
            other => HemoError::from(other),
        })?;

        Ok(Clinician::from(row))
    }

    /// 根据ID查找医生
    pub async fn get_clinician_by_id(&self, id: i64) -> Result<Option<Clinician>> {
        let result = sqlx::query_as::<_, DbClinician>("SELECT * FROM medici WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(result.map(Clinician::from))
    }

    /// 根据用户名查找医生
    pub async fn get_clinician_by_username(&self, username: &str) -> Result<Option<Clinician>> {
        let result = sqlx::query_as::<_, DbClinician>("SELECT * FROM medici WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(result.map(Clinician::from))
    }
}
