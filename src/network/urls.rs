pub const VK_USERS_GET: &str = "https://api.vk.com/method/users.get";
pub const VK_PHOTOS_GET: &str = "https://api.vk.com/method/photos.get";
pub const DISK_RESOURCES: &str = "https://cloud-api.yandex.net/v1/disk/resources";
pub const DISK_UPLOAD: &str = "https://cloud-api.yandex.net/v1/disk/resources/upload";
