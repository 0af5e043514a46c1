//! Response envelopes written with quick-xml.
//!
//! Every body is `<response>` with a `<status>` block (`code`, `message`,
//! `language`) and, on success, a `<result>` block.

use std::io::{self, Write};

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::Writer;

use crate::categories::CategoryGroup;
use crate::store::{timestamp, ArticleRecord, Page, TimelineRecord, UserRecord};

const LANGUAGE: &str = "ja";

/// Writes the contents of `<result>`.
pub trait ToXml {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// A complete envelope; `result` is omitted when `None`.
pub fn envelope<T: ToXml + ?Sized>(code: u16, message: &str, result: Option<&T>) -> Vec<u8> {
    let mut buf = Vec::with_capacity(512);
    if let Err(e) = write_envelope(&mut buf, code, message, result) {
        tracing::error!(error = %e, "failed to serialize response envelope");
        buf.clear();
    }
    buf
}

/// An envelope with a status block only.
pub fn status_only(code: u16, message: &str) -> Vec<u8> {
    envelope::<Empty>(code, message, None)
}

struct Empty;

impl ToXml for Empty {
    fn write_xml<W: Write>(&self, _writer: &mut Writer<W>) -> io::Result<()> {
        Ok(())
    }
}

fn write_envelope<T: ToXml + ?Sized>(
    buf: &mut Vec<u8>,
    code: u16,
    message: &str,
    result: Option<&T>,
) -> io::Result<()> {
    let mut writer = Writer::new(buf);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.create_element("response").write_inner_content(|w| {
        w.create_element("status").write_inner_content(|w| {
            text(w, "code", &code.to_string())?;
            text(w, "message", message)?;
            text(w, "language", LANGUAGE)
        })?;
        if let Some(result) = result {
            w.create_element("result")
                .write_inner_content(|w| result.write_xml(w))?;
        }
        Ok::<(), io::Error>(())
    })?;
    Ok(())
}

fn text<W: Write>(writer: &mut Writer<W>, tag: &str, value: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(value))?;
    Ok(())
}

fn optional_text<W: Write>(writer: &mut Writer<W>, tag: &str, value: Option<&str>) -> io::Result<()> {
    if let Some(value) = value {
        text(writer, tag, value)?;
    }
    Ok(())
}

fn write_timeline<W: Write>(w: &mut Writer<W>, t: &TimelineRecord) -> io::Result<()> {
    w.create_element("timeline").write_inner_content(|w| {
        text(w, "id", &t.id.to_string())?;
        text(w, "title", &t.title)?;
        text(w, "link", &format!("http://timeline.nifty.com/portal/show/{}", t.id))?;
        text(w, "description", &t.description)?;
        text(w, "owner", &t.owner)?;
        text(w, "label_for_vaxis", &t.label_for_vaxis)?;
        text(w, "commentable", if t.commentable { "true" } else { "false" })?;
        text(w, "open_level", &t.open_level.to_string())?;
        text(w, "opened_for", &t.opened_for)?;
        text(w, "lock_level", &t.lock_level.to_string())?;
        text(w, "locked_for", &t.locked_for)?;
        text(w, "articles_count", &t.articles_count.to_string())?;
        text(w, "initial_position", &t.initial_position)?;
        text(w, "time_scale", &t.time_scale)?;
        text(w, "updated_at", &timestamp(&t.updated_at))?;
        text(w, "created_at", &timestamp(&t.created_at))?;
        text(w, "score", "0")?;
        text(w, "point", "0")?;
        text(w, "page_view", &t.page_views.to_string())?;
        text(w, "category", &t.category)
    })?;
    Ok(())
}

fn write_article<W: Write>(w: &mut Writer<W>, a: &ArticleRecord) -> io::Result<()> {
    w.create_element("article").write_inner_content(|w| {
        text(w, "id", &a.id.to_string())?;
        text(w, "title", &a.title)?;
        text(w, "description", &a.description)?;
        text(w, "owner", &a.owner)?;
        text(w, "start_time", &a.start_time)?;
        optional_text(w, "end_time", a.end_time.as_deref())?;
        text(w, "grade", &a.grade)?;
        if a.image.is_some() {
            text(w, "image", &format!("/api/v1/articles/image/{}", a.id))?;
        }
        optional_text(w, "link", a.link.as_deref())?;
        w.create_element("related_links").write_inner_content(|w| {
            for url in &a.related_links {
                text(w, "url", url)?;
            }
            Ok::<(), io::Error>(())
        })?;
        text(w, "updated_at", &timestamp(&a.updated_at))?;
        text(w, "created_at", &timestamp(&a.created_at))
    })?;
    Ok(())
}

fn write_summary<W: Write, T>(w: &mut Writer<W>, page: &Page<T>) -> io::Result<()> {
    w.create_element("summary").write_inner_content(|w| {
        text(w, "total", &page.total.to_string())?;
        text(w, "page", &page.page.to_string())?;
        text(w, "page_count", &page.page_count.to_string())
    })?;
    Ok(())
}

impl ToXml for TimelineRecord {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_timeline(writer, self)
    }
}

impl ToXml for ArticleRecord {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_article(writer, self)
    }
}

impl ToXml for UserRecord {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("user").write_inner_content(|w| {
            text(w, "nickname", &self.nickname)?;
            text(w, "link", &format!("http://timeline.nifty.com/people/show/{}", self.id))?;
            text(w, "introduction", &self.introduction)?;
            if self.image.is_some() {
                text(w, "image", &format!("/api/v1/users/image/{}", self.id))?;
            }
            Ok::<(), io::Error>(())
        })?;
        Ok(())
    }
}

impl ToXml for Page<TimelineRecord> {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_summary(writer, self)?;
        writer.create_element("timelines").write_inner_content(|w| {
            for timeline in &self.items {
                write_timeline(w, timeline)?;
            }
            Ok::<(), io::Error>(())
        })?;
        Ok(())
    }
}

impl ToXml for Page<ArticleRecord> {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_summary(writer, self)?;
        writer.create_element("articles").write_inner_content(|w| {
            for article in &self.items {
                write_article(w, article)?;
            }
            Ok::<(), io::Error>(())
        })?;
        Ok(())
    }
}

impl ToXml for [CategoryGroup] {
    fn write_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        writer.create_element("categories").write_inner_content(|w| {
            for group in self {
                w.create_element("category").write_inner_content(|w| {
                    text(w, "display_name", group.display_name)?;
                    w.create_element("sub_categories").write_inner_content(|w| {
                        for (name, display_name) in group.sub_categories {
                            w.create_element("sub_category").write_inner_content(|w| {
                                text(w, "name", name)?;
                                text(w, "display_name", display_name)
                            })?;
                        }
                        Ok::<(), io::Error>(())
                    })?;
                    Ok::<(), io::Error>(())
                })?;
            }
            Ok::<(), io::Error>(())
        })?;
        Ok(())
    }
}
