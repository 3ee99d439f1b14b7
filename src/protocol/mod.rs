/*!
 * Remote service clients
 *
 * - `s3`: object upload and download
 * - `ses`: transactional email
 */

pub mod s3;
pub mod ses;
