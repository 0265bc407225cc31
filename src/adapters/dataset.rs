//! In-memory employee dataset: Implementation of the `SalaryStatistics` port.
//!
//! Mirrors the row shape of the historical employee CSV. Only descriptive
//! statistics live here; model fitting is an external collaborator.

use serde::{Deserialize, Serialize};

use crate::domain::Column;
use crate::ports::SalaryStatistics;

/// One historical employee record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub age: f64,
    pub healthy_eating: f64,
    pub active_lifestyle: f64,
    pub gender_code: f64,
    pub salary: f64,
}

impl EmployeeRecord {
    fn column(&self, column: Column) -> f64 {
        match column {
            Column::Age => self.age,
            Column::HealthyEating => self.healthy_eating,
            Column::ActiveLifestyle => self.active_lifestyle,
            Column::GenderCode => self.gender_code,
            Column::Salary => self.salary,
        }
    }
}

/// In-memory collection of historical records.
pub struct EmployeeDataset {
    records: Vec<EmployeeRecord>,
}

impl EmployeeDataset {
    /// Create a dataset from records.
    #[must_use]
    pub fn new(records: Vec<EmployeeRecord>) -> Self {
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SalaryStatistics for EmployeeDataset {
    fn mean(&self, column: Column) -> Option<f64> {
        if self.records.is_empty() {
            return None;
        }
        let sum: f64 = self.records.iter().map(|r| r.column(column)).sum();
        Some(sum / self.records.len() as f64)
    }
}
