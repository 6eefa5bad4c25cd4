// # AWS Providers
//
// Implementations of the s3hook-core provider traits on top of the AWS SDK:
//
// - `SqsQueueApi`: `QueueApi` over Amazon SQS
// - `S3NotificationApi`: `BucketNotificationApi` over Amazon S3
// - `AwsClientGetter`: builds both for a given source
//
// ## Constraints
//
// - One API request per trait call (plus the read required to preserve
//   unrelated destinations when writing bucket notifications)
// - No retry loops beyond the SDK's standard retry policy
// - No background tasks, no caching across calls
// - Credentials never appear in logs
//
// ## Error Mapping
//
// | AWS error code                              | `s3hook_core::Error` |
// |---------------------------------------------|----------------------|
// | AccessDenied, InvalidClientTokenId, ...     | `Denied`             |
// | NonExistentQueue, NoSuchBucket              | `NotFound`           |
// | SDK timeout                                 | `Timeout`            |
// | anything else                               | `Provider`           |

mod client_getter;
mod errors;
mod s3;
mod sqs;

pub use client_getter::AwsClientGetter;
pub use s3::S3NotificationApi;
pub use sqs::SqsQueueApi;
