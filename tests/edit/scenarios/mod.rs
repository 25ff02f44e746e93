mod cancellation;
mod concurrency;
mod failures;
