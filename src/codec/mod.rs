pub mod data_uri;
pub mod raster;
pub mod tensor;

pub use data_uri::{decode_base64, encode_base64, strip_data_uri, to_data_uri, JPEG_MIME};
pub use raster::{check_aspect_ratio, correct_orientation, decode_image, encode_jpeg, resize_shorter_side,
                 restore_size, MAX_ASPECT_RATIO};
pub use tensor::{image_to_tensor, tensor_to_image};
