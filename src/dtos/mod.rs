use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod admindtos;
pub mod bookingdtos;
pub mod customerdtos;
pub mod driverdtos;
pub mod messagedtos;
pub mod paymentdtos;

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: i64,
    pub items_per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, limit: usize, total_items: i64) -> Self {
        let total_pages = if total_items <= 0 {
            0
        } else {
            ((total_items as usize) + limit - 1) / limit
        };
        Pagination {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct Response {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_total_pages_up() {
        let p = Pagination::new(1, 20, 41);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total_items, 41);
        assert_eq!(p.items_per_page, 20);
    }

    #[test]
    fn pagination_with_no_items() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }
}
