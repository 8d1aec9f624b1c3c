//! This module flattens a parsed BPMN document into an [`ElementTable`].

use tracing::{debug, warn};

use super::{Document, ElementDescriptor, ElementTable, Properties, XmlElement, BPMN_NAMESPACE};

/// Extract every identifiable element below a process container.
///
/// Elements without an `id` cannot be matched across versions and are skipped.
/// If an ID occurs more than once, the last occurrence wins.
pub fn extract(document: &Document) -> ElementTable {
    let mut table = ElementTable::new();

    let processes = document
        .root
        .descendants()
        .filter(|element| element.local_name == "process")
        .filter(|element| element.namespace.as_deref() == Some(BPMN_NAMESPACE));

    for process in processes {
        // The first item is the process itself, which is a container rather than a diffable element
        for element in process.descendants().skip(1) {
            let Some(id) = element.attribute("id").filter(|id| !id.is_empty()) else {
                continue;
            };
            if let Some(previous) = table.insert(describe(id, element)) {
                warn!(id = %previous.id, "duplicate element id, keeping the last occurrence");
            }
        }
    }

    debug!(elements = table.len(), "extracted process elements");
    table
}

/// Project a single element into its descriptor
fn describe(id: &str, element: &XmlElement) -> ElementDescriptor {
    // Literal attributes first, namespace declarations included
    let mut properties: Properties = element.attributes.iter().cloned().collect();

    let extensions = element
        .child_elements()
        .filter(|child| child.local_name == "extensionElements");
    for extension in extensions.flat_map(|block| block.child_elements()) {
        let key = match &extension.prefix {
            Some(prefix) => format!("{}:{}", prefix, extension.local_name),
            None => extension.local_name.clone(),
        };
        properties.insert(key, extension_value(extension));
    }

    properties.insert("incoming".to_string(), flow_refs(element, "incoming"));
    properties.insert("outgoing".to_string(), flow_refs(element, "outgoing"));

    ElementDescriptor {
        id: id.to_string(),
        element_type: element.local_name.clone(),
        name: element.attribute("name").unwrap_or_default().to_string(),
        properties,
    }
}

/// The text of an extension element as written, or its `class` attribute if it has no text at all
fn extension_value(extension: &XmlElement) -> String {
    let text = extension.text_content();
    if !text.is_empty() {
        return text;
    }
    extension.attribute("class").unwrap_or_default().to_string()
}

/// Comma-joined flow references from every `<bpmn:incoming>` / `<bpmn:outgoing>` below the element,
/// so a sub-process also carries the references of its nested elements.
/// Only elements in the BPMN model namespace count, so extension look-alikes are ignored.
fn flow_refs(element: &XmlElement, local_name: &str) -> String {
    element
        .descendants()
        .skip(1)
        .filter(|child| child.local_name == local_name)
        .filter(|child| child.namespace.as_deref() == Some(BPMN_NAMESPACE))
        .map(XmlElement::text_content)
        .filter(|reference| !reference.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::XmlError;

    const ORDER_PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL"
                  xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                  xmlns:camunda="http://camunda.org/schema/1.0/bpmn"
                  xmlns:other="http://example.com/other"
                  id="Definitions_1">
  <bpmn:process id="Process_1" isExecutable="true">
    <bpmn:startEvent id="Start" name="Order received">
      <bpmn:outgoing>Flow_1</bpmn:outgoing>
    </bpmn:startEvent>
    <bpmn:userTask id="Review" name="Review order" camunda:assignee="clerk">
      <bpmn:extensionElements>
        <camunda:formKey>embedded:review.html</camunda:formKey>
        <camunda:taskListener class="com.example.Listener" />
        <camunda:properties>
          <camunda:property name="a" value="b" />
        </camunda:properties>
      </bpmn:extensionElements>
      <bpmn:incoming>Flow_1</bpmn:incoming>
      <other:incoming>NotAFlow</other:incoming>
      <bpmn:outgoing>Flow_2</bpmn:outgoing>
    </bpmn:userTask>
    <bpmn:sequenceFlow id="Flow_1" sourceRef="Start" targetRef="Review" />
    <bpmn:sequenceFlow id="Flow_2" sourceRef="Review" targetRef="End" />
    <bpmn:endEvent id="End">
      <bpmn:incoming>Flow_2</bpmn:incoming>
    </bpmn:endEvent>
  </bpmn:process>
  <bpmndi:BPMNDiagram id="Diagram_1">
    <bpmndi:BPMNPlane id="Plane_1" bpmnElement="Process_1" />
  </bpmndi:BPMNDiagram>
</bpmn:definitions>"#;

    fn extract_str(xml: &str) -> Result<ElementTable, XmlError> {
        Ok(extract(&Document::parse(xml)?))
    }

    #[test]
    fn test_only_process_descendants_with_ids() -> Result<(), XmlError> {
        let table = extract_str(ORDER_PROCESS)?;
        let ids = table.ids().collect::<Vec<_>>();
        assert_eq!(ids, vec!["Start", "Review", "Flow_1", "Flow_2", "End"]);
        assert!(!table.contains("Process_1"));
        assert!(!table.contains("Plane_1"));
        Ok(())
    }

    #[test]
    fn test_descriptor_fields() -> Result<(), XmlError> {
        let table = extract_str(ORDER_PROCESS)?;
        let review = table.get("Review").expect("Review should be extracted");
        assert_eq!(review.element_type, "userTask");
        assert_eq!(review.name, "Review order");

        let props = &review.properties;
        assert_eq!(props.get("id").map(String::as_str), Some("Review"));
        assert_eq!(props.get("camunda:assignee").map(String::as_str), Some("clerk"));
        assert_eq!(props.get("camunda:formKey").map(String::as_str), Some("embedded:review.html"));
        assert_eq!(props.get("camunda:taskListener").map(String::as_str), Some("com.example.Listener"));
        // Whitespace-only text is still text, so no `class` fallback
        let properties = props.get("camunda:properties").expect("camunda:properties should be extracted");
        assert!(!properties.is_empty() && properties.trim().is_empty());
        assert_eq!(props.get("incoming").map(String::as_str), Some("Flow_1"));
        assert_eq!(props.get("outgoing").map(String::as_str), Some("Flow_2"));
        Ok(())
    }

    #[test]
    fn test_missing_substructure_is_empty() -> Result<(), XmlError> {
        let table = extract_str(ORDER_PROCESS)?;
        let flow = table.get("Flow_1").expect("Flow_1 should be extracted");
        assert_eq!(flow.name, "");
        assert_eq!(flow.properties.get("incoming").map(String::as_str), Some(""));
        assert_eq!(flow.properties.get("outgoing").map(String::as_str), Some(""));
        assert_eq!(flow.properties.get("sourceRef").map(String::as_str), Some("Start"));
        Ok(())
    }

    #[test]
    fn test_duplicate_id_last_wins() -> Result<(), XmlError> {
        let table = extract_str(
            r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
                 <process id="P">
                   <task id="T1" name="first" />
                   <task id="T2" />
                   <task id="T1" name="second" />
                 </process>
               </definitions>"#,
        )?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("T1").map(|e| e.name.as_str()), Some("second"));
        Ok(())
    }

    #[test]
    fn test_default_namespace_flows_and_declarations() -> Result<(), XmlError> {
        let table = extract_str(
            r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
                 <process id="P">
                   <exclusiveGateway id="G1" xmlns:x="urn:x">
                     <incoming>F1</incoming>
                     <incoming>F2</incoming>
                   </exclusiveGateway>
                 </process>
               </definitions>"#,
        )?;
        let gateway = table.get("G1").expect("G1 should be extracted");
        assert_eq!(gateway.properties.get("incoming").map(String::as_str), Some("F1,F2"));
        assert_eq!(gateway.properties.get("xmlns:x").map(String::as_str), Some("urn:x"));
        Ok(())
    }

    #[test]
    fn test_sub_process_collects_nested_refs() -> Result<(), XmlError> {
        let table = extract_str(
            r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
                 <process id="P">
                   <subProcess id="S">
                     <incoming>F0</incoming>
                     <task id="T"><incoming>Fa</incoming><outgoing>Fb</outgoing></task>
                     <outgoing>F9</outgoing>
                   </subProcess>
                 </process>
               </definitions>"#,
        )?;
        let sub_process = table.get("S").expect("S should be extracted");
        assert_eq!(sub_process.properties.get("incoming").map(String::as_str), Some("F0,Fa"));
        assert_eq!(sub_process.properties.get("outgoing").map(String::as_str), Some("Fb,F9"));
        let task = table.get("T").expect("T should be extracted");
        assert_eq!(task.properties.get("incoming").map(String::as_str), Some("Fa"));
        Ok(())
    }

    #[test]
    fn test_extension_text_kept_verbatim() -> Result<(), XmlError> {
        let table = extract_str(
            r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" xmlns:camunda="http://camunda.org/schema/1.0/bpmn">
                 <bpmn:process id="P">
                   <bpmn:scriptTask id="S">
                     <bpmn:extensionElements><camunda:script class="Fallback">  x
</camunda:script></bpmn:extensionElements>
                   </bpmn:scriptTask>
                 </bpmn:process>
               </bpmn:definitions>"#,
        )?;
        let script = table.get("S").expect("S should be extracted");
        assert_eq!(script.properties.get("camunda:script").map(String::as_str), Some("  x\n"));
        Ok(())
    }

    #[test]
    fn test_only_bpmn_process_is_a_container() -> Result<(), XmlError> {
        let table = extract_str(
            r#"<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" xmlns:x="urn:vendor">
                 <bpmn:process id="P">
                   <bpmn:task id="T">
                     <bpmn:extensionElements>
                       <x:process><x:step id="Inner" /></x:process>
                     </bpmn:extensionElements>
                   </bpmn:task>
                 </bpmn:process>
                 <x:process><x:step id="Outside" /></x:process>
               </bpmn:definitions>"#,
        )?;
        assert_eq!(table.ids().collect::<Vec<_>>(), vec!["T", "Inner"]);
        Ok(())
    }
}
