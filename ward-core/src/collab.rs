//! Các cộng tác viên bên ngoài: đồng hồ, sinh định danh, nguồn dữ liệu mẫu.

use std::cell::Cell;

use chrono::{Local, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::model::Patient;

/// Nguồn thời gian hiện tại (giờ địa phương).
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Đồng hồ cố định cho test.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Sinh định danh duy nhất cho bản ghi mới.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Định danh tuần tự `prefix-1`, `prefix-2`... dùng khi cần kết quả lặp lại được.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let next = self.counter.get() + 1;
        self.counter.set(next);
        format!("{}-{next}", self.prefix)
    }
}

/// Chiến lược tạo danh sách bệnh nhân ban đầu.
pub trait PatientSeeder {
    fn seed(&mut self, today: NaiveDate) -> Vec<Patient>;
}

/// Trả lại đúng danh sách đã cho; dùng trong test.
#[derive(Debug, Clone, Default)]
pub struct FixedSeeder(pub Vec<Patient>);

impl PatientSeeder for FixedSeeder {
    fn seed(&mut self, _today: NaiveDate) -> Vec<Patient> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_unique_and_ordered() {
        let ids = SequentialIds::new("n");
        assert_eq!(ids.next_id(), "n-1");
        assert_eq!(ids.next_id(), "n-2");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
