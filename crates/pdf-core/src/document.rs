//! PDF Document wrapper

use crate::annotations::{page_widgets, resolve, WidgetAnnotation};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{PdfError, Result, StandardFont};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// PDF Document wrapper providing high-level operations
///
/// Drawing calls are buffered per page and written out on save, on top of
/// the existing page content.
#[derive(Debug)]
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Font used for all inserted text
    font: StandardFont,
    /// Font dictionary object, added on first use
    font_object: Option<ObjectId>,
    /// Page font resources (page number -> resource name)
    page_font_resources: HashMap<usize, String>,
    /// Embedded images (data hash -> PDF object ID)
    embedded_images: HashMap<u64, ObjectId>,
    /// Page image resources (page number -> object ID -> resource name)
    page_image_resources: HashMap<usize, HashMap<ObjectId, String>>,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: BTreeMap<usize, Vec<u8>>,
}

impl PdfDocument {
    /// Open a PDF document from a file path
    ///
    /// # Example
    /// ```ignore
    /// let doc = PdfDocument::open("template.pdf")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = Document::load(path).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Open a PDF document from bytes
    pub fn open_from_bytes(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;
        Ok(Self::from_document(inner))
    }

    /// Wrap an already-loaded lopdf document
    pub fn from_document(inner: Document) -> Self {
        Self {
            inner,
            font: StandardFont::default(),
            font_object: None,
            page_font_resources: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            page_content_buffer: BTreeMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Object id of a page (1-indexed)
    pub fn page_id(&self, page: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(PdfError::InvalidPage(page, pages.len()))
    }

    /// Widget annotations of a page (1-indexed), in `/Annots` order
    pub fn widgets(&self, page: usize) -> Result<Vec<WidgetAnnotation>> {
        let page_id = self.page_id(page)?;
        page_widgets(&self.inner, page_id)
    }

    /// Insert text with its baseline origin at `(x, y)`
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (from left)
    /// * `y` - Y coordinate in points (from bottom)
    /// * `font_size` - Font size in points
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        font_size: f32,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        // Skip empty text - nothing to render
        if text.is_empty() {
            return Ok(());
        }

        let font_name = self.get_or_create_font_ref(page)?;
        let ctx = TextRenderContext {
            font_name,
            font_size,
        };
        let operators = generate_text_operators(&self.font.encode_text_hex(text), x, y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Insert an image stretched to the given box
    ///
    /// # Arguments
    /// * `data` - Image file bytes (JPEG or PNG)
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate of the lower-left corner in points
    /// * `y` - Y coordinate of the lower-left corner in points (from bottom)
    /// * `width` - Image width in points
    /// * `height` - Image height in points
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let image_resource_name = self.get_or_create_image_ref(data, page)?;
        let operators = generate_image_operators(&image_resource_name, x, y, width, height);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Drop every page after the first `count` pages
    pub fn truncate_pages(&mut self, count: usize) {
        let total = self.page_count();
        if count >= total {
            return;
        }
        let extra: Vec<u32> = ((count + 1)..=total).map(|p| p as u32).collect();
        self.inner.delete_pages(&extra);
        self.page_content_buffer.retain(|&page, _| page <= count);
    }

    /// Set a field dictionary's `/V` to a name value
    pub fn set_field_value(&mut self, field_id: ObjectId, value: &str) -> Result<()> {
        let field = self
            .inner
            .get_dictionary_mut(field_id)
            .map_err(|_| PdfError::ParseError(format!("Field {field_id:?} is not a dictionary")))?;
        field.set("V", Object::Name(value.as_bytes().to_vec()));
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush_content_buffers()?;

        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush_content_buffers()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    /// Get a reference to the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Get or create the font resource name for a page
    fn get_or_create_font_ref(&mut self, page: usize) -> Result<String> {
        if let Some(name) = self.page_font_resources.get(&page) {
            return Ok(name.clone());
        }

        let font_id = match self.font_object {
            Some(id) => id,
            None => {
                let id = self.inner.add_object(self.font.to_pdf_dictionary());
                self.font_object = Some(id);
                id
            }
        };

        let name = self.register_page_resource(page, "Font", "F", font_id)?;
        self.page_font_resources.insert(page, name.clone());
        Ok(name)
    }

    /// Get or create an image reference for a specific page
    ///
    /// Images are deduplicated by hash of their data.
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash) {
            Some(id) => *id,
            None => {
                let xobject = ImageXObject::decode(data)?;
                let mask_id = xobject
                    .soft_mask_stream()
                    .map(|mask| self.inner.add_object(mask));
                let id = self.inner.add_object(xobject.to_pdf_stream(mask_id));
                self.embedded_images.insert(data_hash, id);
                id
            }
        };

        if let Some(name) = self
            .page_image_resources
            .get(&page)
            .and_then(|images| images.get(&object_id))
        {
            return Ok(name.clone());
        }

        let name = self.register_page_resource(page, "XObject", "Im", object_id)?;
        self.page_image_resources
            .entry(page)
            .or_default()
            .insert(object_id, name.clone());
        Ok(name)
    }

    /// Add an object to a page's resource category under a fresh name
    ///
    /// The page's (possibly inherited or indirect) `/Resources` is copied onto
    /// the page itself, so names already used by the template never collide.
    fn register_page_resource(
        &mut self,
        page: usize,
        category: &str,
        prefix: &str,
        object_id: ObjectId,
    ) -> Result<String> {
        let page_id = self.page_id(page)?;
        let mut resources = self.effective_resources(page_id)?;

        let mut entries = match resources.get(category.as_bytes()) {
            Ok(obj) => resolve(&self.inner, obj)?
                .as_dict()
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            Err(_) => Dictionary::new(),
        };

        let mut counter = 1;
        let name = loop {
            let candidate = format!("{prefix}{counter}");
            if !entries.has(candidate.as_bytes()) {
                break candidate;
            }
            counter += 1;
        };

        entries.set(name.clone(), Object::Reference(object_id));
        resources.set(category, Object::Dictionary(entries));

        let page_dict = self.inner.get_dictionary_mut(page_id)?;
        page_dict.set("Resources", Object::Dictionary(resources));

        Ok(name)
    }

    /// Resources of a page, following the `/Parent` chain for inherited ones
    fn effective_resources(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut current_id = page_id;

        // Follow parent chain up to 10 levels (safety limit)
        for _ in 0..10 {
            let dict = self.inner.get_dictionary(current_id)?;

            if let Ok(resources) = dict.get(b"Resources") {
                return Ok(resolve(&self.inner, resources)?
                    .as_dict()
                    .cloned()
                    .unwrap_or_else(|_| Dictionary::new()));
            }

            match dict.get(b"Parent").and_then(Object::as_reference) {
                Ok(parent_id) => current_id = parent_id,
                Err(_) => break,
            }
        }

        Ok(Dictionary::new())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);

        for (page, content) in buffers {
            if !content.is_empty() {
                self.append_to_content_stream(page, &content)?;
            }
        }

        Ok(())
    }

    /// Append content after a page's existing content streams
    ///
    /// The original streams are left untouched and bracketed by `q`/`Q`, so
    /// any graphics state they leave behind does not leak into the overlay.
    fn append_to_content_stream(&mut self, page: usize, content: &[u8]) -> Result<()> {
        let page_id = self.page_id(page)?;

        let current = self
            .inner
            .get_dictionary(page_id)?
            .get(b"Contents")
            .ok()
            .cloned();

        let existing: Vec<Object> = match current {
            Some(Object::Reference(id)) => match self.inner.get_object(id)? {
                Object::Array(items) => items.clone(),
                _ => vec![Object::Reference(id)],
            },
            Some(Object::Array(items)) => items,
            Some(Object::Stream(stream)) => vec![Object::Reference(self.inner.add_object(stream))],
            _ => Vec::new(),
        };

        let mut contents = Vec::with_capacity(existing.len() + 2);
        let overlay = if existing.is_empty() {
            content.to_vec()
        } else {
            let open_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(open_id));
            contents.extend(existing);

            let mut overlay = b"\nQ\n".to_vec();
            overlay.extend_from_slice(content);
            overlay
        };

        let overlay_id = self
            .inner
            .add_object(Stream::new(Dictionary::new(), overlay));
        contents.push(Object::Reference(overlay_id));

        let page_dict = self.inner.get_dictionary_mut(page_id)?;
        page_dict.set("Contents", Object::Array(contents));

        Ok(())
    }
}
