//! Image registration ahead of layer attachment

use crate::{rendering::renderer::Renderer, MapError, Result};
use async_trait::async_trait;
use futures::future::try_join_all;
use log::{debug, info};
use once_cell::sync::Lazy;

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

/// Fetches and decodes images referenced by layers
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load_image(&self, url: &str) -> Result<image::RgbaImage>;
}

/// Loads images over HTTP(S) and decodes PNG/JPEG data
#[derive(Debug, Clone)]
pub struct HttpImageLoader {
    client: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load_image(&self, url: &str) -> Result<image::RgbaImage> {
        debug!("Fetching image {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| MapError::ImageLoad {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(decoded.to_rgba8())
    }
}

/// Loads every image the renderer does not have yet and registers it under its URL.
///
/// All loads run concurrently; if any of them fails nothing is registered
/// and the first error is returned. Returns the number of images added.
pub async fn add_images(
    renderer: &mut dyn Renderer,
    loader: &dyn ImageLoader,
    urls: &[String],
) -> Result<usize> {
    let mut missing: Vec<&str> = Vec::new();
    for url in urls {
        if !renderer.has_image(url) && !missing.contains(&url.as_str()) {
            missing.push(url);
        }
    }

    if missing.is_empty() {
        return Ok(0);
    }

    let loaded = try_join_all(missing.iter().map(|url| async move {
        loader.load_image(url).await.map(|image| (*url, image))
    }))
    .await?;

    let mut added = 0;
    for (url, image) in loaded {
        if !renderer.has_image(url) {
            renderer.add_image(url, image)?;
            added += 1;
        }
    }

    info!("Registered {} images", added);
    Ok(added)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::rendering::headless::HeadlessRenderer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a 1x1 image for every URL except the ones listed as failing
    #[derive(Default)]
    pub(crate) struct StaticImageLoader {
        pub failing: Vec<String>,
        pub loads: AtomicUsize,
    }

    impl StaticImageLoader {
        pub fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(|u| u.to_string()).collect(),
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ImageLoader for StaticImageLoader {
        async fn load_image(&self, url: &str) -> Result<image::RgbaImage> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.failing.iter().any(|f| f == url) {
                return Err(MapError::ImageLoad {
                    url: url.to_string(),
                    reason: "not found".to_string(),
                });
            }
            Ok(image::RgbaImage::new(1, 1))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_adds_missing_images_once() {
        let mut renderer = HeadlessRenderer::loaded();
        let loader = StaticImageLoader::default();

        let added = add_images(&mut renderer, &loader, &urls(&["a.png", "b.png", "a.png"]))
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);

        let added = add_images(&mut renderer, &loader, &urls(&["a.png", "c.png"]))
            .await
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(renderer.image_count(), 3);
    }

    #[tokio::test]
    async fn test_one_failure_registers_nothing() {
        let mut renderer = HeadlessRenderer::loaded();
        let loader = StaticImageLoader::failing(&["b.png"]);

        let result = add_images(&mut renderer, &loader, &urls(&["a.png", "b.png"])).await;
        assert!(matches!(result, Err(MapError::ImageLoad { .. })));
        assert_eq!(renderer.image_count(), 0);
    }
}
