pub mod review_records;
